//! Types for the T411 proxy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::ClientError;
use crate::mapper::MapperError;
use crate::taxonomy::TaxonomyError;

/// Default number of results requested per search.
const DEFAULT_MAX_RESULTS: u32 = 10;

/// A search expressed with human-readable names instead of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendlySearchQuery {
    /// Free-text expression, passed through unchanged.
    #[serde(default)]
    pub expression: Option<String>,
    /// Category name, resolved to an id against the cached taxonomy.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Term names, only resolved when a category is given.
    #[serde(default)]
    pub term_names: Vec<String>,
    /// Page size; `None` lets the API pick.
    #[serde(default = "default_max_results")]
    pub max_results: Option<u32>,
}

fn default_max_results() -> Option<u32> {
    Some(DEFAULT_MAX_RESULTS)
}

impl Default for FriendlySearchQuery {
    fn default() -> Self {
        Self {
            expression: None,
            category_name: None,
            term_names: Vec::new(),
            max_results: default_max_results(),
        }
    }
}

impl FriendlySearchQuery {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: Some(expression.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }

    pub fn with_term(mut self, name: impl Into<String>) -> Self {
        self.term_names.push(name.into());
        self
    }

    pub fn with_max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }
}

/// Counts reported after a taxonomy synchronization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub categories: usize,
    pub root_categories: usize,
    pub term_types: usize,
    pub associations: usize,
}

/// Errors that can occur in proxy operations.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The API refused the configured credentials.
    #[error("T411 authentication rejected (code {code:?}): {message}")]
    AuthenticationRejected { code: Option<i64>, message: String },

    /// The API answered with an error envelope.
    #[error("T411 API error (code {code:?}): {message}")]
    Api { code: Option<i64>, message: String },

    /// REST client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Taxonomy store error.
    #[error("taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    /// Response mapping error.
    #[error("mapping error: {0}")]
    Mapping(#[from] MapperError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_friendly_query_defaults_to_ten_results() {
        let query = FriendlySearchQuery::new("sintel");
        assert_eq!(query.expression.as_deref(), Some("sintel"));
        assert_eq!(query.max_results, Some(10));
        assert!(query.category_name.is_none());
        assert!(query.term_names.is_empty());
    }

    #[test]
    fn test_friendly_query_builder() {
        let query = FriendlySearchQuery::new("sintel")
            .with_category("Film")
            .with_term("VOSTFR")
            .with_term("1080p")
            .with_max_results(None);

        assert_eq!(query.category_name.as_deref(), Some("Film"));
        assert_eq!(query.term_names, vec!["VOSTFR", "1080p"]);
        assert_eq!(query.max_results, None);
    }

    #[test]
    fn test_friendly_query_deserialize_default_max_results() {
        let query: FriendlySearchQuery =
            serde_json::from_str(r#"{"expression": "sintel"}"#).unwrap();
        assert_eq!(query.max_results, Some(10));
    }

    #[test]
    fn test_proxy_error_display() {
        let err = ProxyError::AuthenticationRejected {
            code: Some(107),
            message: "Wrong password".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "T411 authentication rejected (code Some(107)): Wrong password"
        );

        let err: ProxyError = TaxonomyError::NotFound("category Film".to_string()).into();
        assert!(err.to_string().contains("category Film"));
    }
}
