//! T411 REST API client.
//!
//! The proxy talks to the API through the [`T411Api`] trait so tests can
//! substitute [`crate::testing::MockT411Api`] for the HTTP implementation.

mod rest;
mod types;

pub use rest::{search_path, T411RestClient};
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;

/// Default API host.
pub const T411_API_HOST: &str = "api.t411.in";

pub const AUTH_PATH: &str = "/auth";
pub const CATEGORY_TREE_PATH: &str = "/categories/tree/";
pub const TERM_TREE_PATH: &str = "/terms/tree/";
pub const SEARCH_PATH: &str = "/torrents/search/";

/// Operations of the T411 API used by the proxy.
#[async_trait]
pub trait T411Api: Send + Sync {
    /// Exchange the stored credentials for a token.
    ///
    /// A refusal from the API is an `Ok(AuthOutcome::Rejected)`; only
    /// transport and decoding problems are errors.
    async fn authenticate(&self) -> Result<AuthOutcome, ClientError>;

    /// Whether a token is held.
    async fn is_authenticated(&self) -> bool;

    /// Replace the credentials and drop any held token.
    async fn set_credentials(&self, credentials: Credentials);

    /// Raw category tree.
    async fn fetch_category_tree(&self) -> Result<Value, ClientError>;

    /// Raw term tree, keyed by category id then term type id.
    async fn fetch_term_tree(&self) -> Result<Value, ClientError>;

    /// Raw search response for a single page.
    async fn search(&self, query: &ClientQuery) -> Result<Value, ClientError>;
}

/// Error code of an API error envelope (`{"code": ..., "error": ...}`).
///
/// T411 sends codes either as numbers or as strings.
pub fn error_code(code: &Value) -> Option<i64> {
    match code {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Extract `(code, message)` when a response body is an API error envelope.
pub fn api_error(body: &Value) -> Option<(Option<i64>, String)> {
    let message = body.get("error")?;
    let message = match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let code = body.get("code").and_then(error_code);
    Some((code, message))
}
