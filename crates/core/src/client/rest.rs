//! HTTP implementation of the T411 API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::config::ApiConfig;

use super::{
    error_code, AuthOutcome, ClientError, ClientQuery, Credentials, T411Api, AUTH_PATH,
    CATEGORY_TREE_PATH, SEARCH_PATH, TERM_TREE_PATH,
};

/// T411 REST client.
///
/// Holds the credentials and, once authenticated, the API token that is sent
/// as `Authorization` header on every request.
pub struct T411RestClient {
    client: Client,
    base_url: String,
    credentials: RwLock<Credentials>,
    token: RwLock<Option<String>>,
}

impl T411RestClient {
    /// Create a new client. No request is made until [`T411Api::authenticate`].
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}://{}", config.url_scheme, config.host),
            credentials: RwLock::new(Credentials::new(&config.username, &config.password)),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` with the API token and decode the JSON body.
    ///
    /// Calling this before authenticating is a caller bug and fails with
    /// [`ClientError::NotAuthenticated`] without touching the network.
    pub async fn fetch_json(&self, path: &str) -> Result<Value, ClientError> {
        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ClientError::NotAuthenticated)?;

        debug!(path = path, "T411 request");

        let response = self
            .client
            .get(self.url(path))
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(ClientError::transport)?;

        decode_json(response).await
    }
}

#[async_trait]
impl T411Api for T411RestClient {
    async fn authenticate(&self) -> Result<AuthOutcome, ClientError> {
        let credentials = self.credentials.read().await.clone();

        let params = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];

        let response = self
            .client
            .post(self.url(AUTH_PATH))
            .form(&params)
            .send()
            .await
            .map_err(ClientError::transport)?;

        let body: AuthResponse = serde_json::from_value(decode_json(response).await?)
            .map_err(|e| ClientError::Parse(format!("Invalid auth response: {}", e)))?;

        if let Some(message) = body.error {
            let code = body.code.as_ref().and_then(error_code);
            error!(code = ?code, error = %message, "T411 authentication rejected");
            return Ok(AuthOutcome::Rejected { code, message });
        }

        let token = body.token.ok_or_else(|| {
            ClientError::Parse("Auth response has neither token nor error".to_string())
        })?;

        *self.token.write().await = Some(token);
        debug!(username = %credentials.username, "T411 authentication successful");

        Ok(AuthOutcome::Authenticated)
    }

    async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn set_credentials(&self, credentials: Credentials) {
        *self.token.write().await = None;
        *self.credentials.write().await = credentials;
    }

    async fn fetch_category_tree(&self) -> Result<Value, ClientError> {
        self.fetch_json(CATEGORY_TREE_PATH).await
    }

    async fn fetch_term_tree(&self) -> Result<Value, ClientError> {
        self.fetch_json(TERM_TREE_PATH).await
    }

    async fn search(&self, query: &ClientQuery) -> Result<Value, ClientError> {
        self.fetch_json(&search_path(query)).await
    }
}

/// Build the search path and query string for a client query.
///
/// Parameters are emitted in the order `cat`, `limit`, `offset`, then one
/// `term[<term_type_id>][]` per selected term.
pub fn search_path(query: &ClientQuery) -> String {
    let mut path = SEARCH_PATH.to_string();
    if let Some(expression) = &query.expression {
        path.push_str(&urlencoding::encode(expression));
    }

    let mut params: Vec<(String, String)> = Vec::new();
    if let Some(category_id) = query.category_id {
        params.push(("cat".to_string(), category_id.to_string()));
    }
    if let Some(limit) = query.result_per_page {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.page_index {
        params.push(("offset".to_string(), offset.to_string()));
    }
    for term in &query.terms {
        params.push((
            format!("term[{}][]", term.term_type_id),
            term.term_id.to_string(),
        ));
    }

    if !params.is_empty() {
        let encoded: Vec<String> = params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect();
        path.push('?');
        path.push_str(&encoded.join("&"));
    }

    path
}

async fn decode_json(response: Response) -> Result<Value, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: body.chars().take(200).collect(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

// T411 API response types
#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: Option<String>,
    code: Option<Value>,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TermSelector;

    fn api_config() -> ApiConfig {
        ApiConfig {
            username: "alice".to_string(),
            password: "secret".to_string(),
            url_scheme: "https".to_string(),
            host: "api.t411.in".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_base_url_from_scheme_and_host() {
        let client = T411RestClient::new(&api_config()).unwrap();
        assert_eq!(client.base_url(), "https://api.t411.in");
    }

    #[test]
    fn test_search_path_full_query() {
        let query = ClientQuery {
            expression: Some("foo".to_string()),
            category_id: Some(7),
            result_per_page: Some(10),
            page_index: Some(0),
            terms: vec![
                TermSelector {
                    term_id: 3,
                    term_type_id: 1,
                },
                TermSelector {
                    term_id: 4,
                    term_type_id: 1,
                },
            ],
        };

        assert_eq!(
            search_path(&query),
            "/torrents/search/foo?cat=7&limit=10&offset=0&term%5B1%5D%5B%5D=3&term%5B1%5D%5B%5D=4"
        );
    }

    #[test]
    fn test_search_path_omits_unset_fields() {
        let query = ClientQuery {
            expression: Some("foo".to_string()),
            result_per_page: Some(25),
            ..Default::default()
        };
        assert_eq!(search_path(&query), "/torrents/search/foo?limit=25");

        let query = ClientQuery {
            expression: Some("foo".to_string()),
            ..Default::default()
        };
        assert_eq!(search_path(&query), "/torrents/search/foo");
    }

    #[test]
    fn test_search_path_encodes_expression() {
        let query = ClientQuery {
            expression: Some("le fabuleux destin/amélie".to_string()),
            ..Default::default()
        };
        assert_eq!(
            search_path(&query),
            "/torrents/search/le%20fabuleux%20destin%2Fam%C3%A9lie"
        );
    }

    #[test]
    fn test_search_path_without_expression() {
        let query = ClientQuery {
            category_id: Some(631),
            ..Default::default()
        };
        assert_eq!(search_path(&query), "/torrents/search/?cat=631");
    }

    #[tokio::test]
    async fn test_fetch_json_requires_authentication() {
        let client = T411RestClient::new(&api_config()).unwrap();
        assert!(!client.is_authenticated().await);

        let result = client.fetch_category_tree().await;
        assert!(matches!(result, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_set_credentials_drops_token() {
        let client = T411RestClient::new(&api_config()).unwrap();
        *client.token.write().await = Some("12345:67:abcdef".to_string());
        assert!(client.is_authenticated().await);

        client.set_credentials(Credentials::new("bob", "other")).await;

        assert!(!client.is_authenticated().await);
        assert_eq!(client.credentials.read().await.username, "bob");
    }
}
