//! Mock T411 API for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::{AuthOutcome, ClientError, ClientQuery, Credentials, T411Api};

use super::fixtures;

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    Authenticate,
    FetchCategoryTree,
    FetchTermTree,
    Search(ClientQuery),
}

/// Mock implementation of the T411Api trait.
///
/// Provides controllable behavior for testing:
/// - Authentication accepted or rejected
/// - Configurable category tree, term tree and search response
/// - Call recording and one-shot failures
///
/// Starts unauthenticated and serves [`fixtures::category_tree`],
/// [`fixtures::term_tree`] and an empty search response. Like the real API,
/// fetches fail with [`ClientError::NotAuthenticated`] before a successful
/// authentication.
///
/// # Example
///
/// ```rust,ignore
/// use t411_core::testing::{MockT411Api, RecordedCall};
///
/// let api = Arc::new(MockT411Api::new());
/// let proxy = T411Proxy::new(api.clone(), store);
///
/// proxy.synchronize_taxonomy().await?;
///
/// let calls = api.recorded_calls().await;
/// assert_eq!(calls[0], RecordedCall::Authenticate);
/// ```
pub struct MockT411Api {
    /// Outcome returned by `authenticate`.
    auth_outcome: Arc<RwLock<AuthOutcome>>,
    /// Whether a token is currently held.
    authenticated: Arc<RwLock<bool>>,
    /// Last credentials passed to `set_credentials`.
    credentials: Arc<RwLock<Option<Credentials>>>,
    category_tree: Arc<RwLock<Value>>,
    term_tree: Arc<RwLock<Value>>,
    search_response: Arc<RwLock<Value>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<ClientError>>>,
    /// Recorded calls.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
}

impl std::fmt::Debug for MockT411Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockT411Api")
            .field("auth_outcome", &"<auth_outcome>")
            .field("authenticated", &"<authenticated>")
            .field("calls", &"<calls>")
            .finish()
    }
}

impl Default for MockT411Api {
    fn default() -> Self {
        Self::new()
    }
}

impl MockT411Api {
    /// Create a mock that accepts any credentials and serves the fixtures.
    pub fn new() -> Self {
        Self {
            auth_outcome: Arc::new(RwLock::new(AuthOutcome::Authenticated)),
            authenticated: Arc::new(RwLock::new(false)),
            credentials: Arc::new(RwLock::new(None)),
            category_tree: Arc::new(RwLock::new(fixtures::category_tree())),
            term_tree: Arc::new(RwLock::new(fixtures::term_tree())),
            search_response: Arc::new(RwLock::new(fixtures::empty_search_response())),
            next_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Set the outcome of subsequent `authenticate` calls.
    pub async fn set_auth_outcome(&self, outcome: AuthOutcome) {
        *self.auth_outcome.write().await = outcome;
    }

    /// Force the authenticated state, as if a token was already held.
    pub async fn set_authenticated(&self, authenticated: bool) {
        *self.authenticated.write().await = authenticated;
    }

    pub async fn set_category_tree(&self, tree: Value) {
        *self.category_tree.write().await = tree;
    }

    pub async fn set_term_tree(&self, tree: Value) {
        *self.term_tree.write().await = tree;
    }

    pub async fn set_search_response(&self, response: Value) {
        *self.search_response.write().await = response;
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: ClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Last credentials set through `set_credentials`.
    pub async fn credentials(&self) -> Option<Credentials> {
        self.credentials.read().await.clone()
    }

    /// Get recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    /// Record a call and fail if an error is pending.
    async fn enter(&self, call: RecordedCall) -> Result<(), ClientError> {
        self.calls.write().await.push(call);
        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn require_auth(&self) -> Result<(), ClientError> {
        if *self.authenticated.read().await {
            Ok(())
        } else {
            Err(ClientError::NotAuthenticated)
        }
    }
}

#[async_trait]
impl T411Api for MockT411Api {
    async fn authenticate(&self) -> Result<AuthOutcome, ClientError> {
        self.enter(RecordedCall::Authenticate).await?;

        let outcome = self.auth_outcome.read().await.clone();
        *self.authenticated.write().await = outcome.is_authenticated();
        Ok(outcome)
    }

    async fn is_authenticated(&self) -> bool {
        *self.authenticated.read().await
    }

    async fn set_credentials(&self, credentials: Credentials) {
        *self.authenticated.write().await = false;
        *self.credentials.write().await = Some(credentials);
    }

    async fn fetch_category_tree(&self) -> Result<Value, ClientError> {
        self.enter(RecordedCall::FetchCategoryTree).await?;
        self.require_auth().await?;
        Ok(self.category_tree.read().await.clone())
    }

    async fn fetch_term_tree(&self) -> Result<Value, ClientError> {
        self.enter(RecordedCall::FetchTermTree).await?;
        self.require_auth().await?;
        Ok(self.term_tree.read().await.clone())
    }

    async fn search(&self, query: &ClientQuery) -> Result<Value, ClientError> {
        self.enter(RecordedCall::Search(query.clone())).await?;
        self.require_auth().await?;
        Ok(self.search_response.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_requires_authentication() {
        let api = MockT411Api::new();
        let result = api.fetch_category_tree().await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));

        assert_eq!(api.authenticate().await.unwrap(), AuthOutcome::Authenticated);
        assert!(api.fetch_category_tree().await.is_ok());
    }

    #[tokio::test]
    async fn test_next_error_is_one_shot() {
        let api = MockT411Api::new();
        api.set_next_error(ClientError::Timeout).await;

        assert!(matches!(
            api.authenticate().await,
            Err(ClientError::Timeout)
        ));
        assert!(api.authenticate().await.is_ok());
        assert_eq!(api.recorded_calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_rejected_outcome_keeps_unauthenticated() {
        let api = MockT411Api::new();
        api.set_auth_outcome(AuthOutcome::Rejected {
            code: Some(107),
            message: "Wrong password".to_string(),
        })
        .await;

        let outcome = api.authenticate().await.unwrap();
        assert!(!outcome.is_authenticated());
        assert!(!api.is_authenticated().await);
    }
}
