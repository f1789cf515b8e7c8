//! Types for the T411 REST client.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// T411 account credentials.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Result of an authentication attempt that reached the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A token was issued and is now attached to every request.
    Authenticated,
    /// The API refused the credentials.
    Rejected { code: Option<i64>, message: String },
}

impl AuthOutcome {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated)
    }
}

/// A `term[<term_type_id>][]=<term_id>` search filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSelector {
    pub term_id: i64,
    pub term_type_id: i64,
}

/// Search parameters in the API's own vocabulary.
///
/// Fields left unset are omitted from the request; no defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Sent as `cat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Sent as `limit`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_per_page: Option<u32>,
    /// Sent as `offset`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<TermSelector>,
}

/// Errors that can occur when talking to the T411 API.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Not authenticated against the T411 API")]
    NotAuthenticated,
}

impl ClientError {
    /// Classify a reqwest transport error.
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout
        } else if e.is_connect() {
            ClientError::ConnectionFailed(e.to_string())
        } else {
            ClientError::Http(e)
        }
    }
}
