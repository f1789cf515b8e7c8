use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::client::T411_API_HOST;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// T411 API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// T411 account name
    #[serde(default)]
    pub username: String,
    /// T411 account password
    #[serde(default)]
    pub password: String,
    /// URL scheme used to reach the API ("http" or "https")
    #[serde(default = "default_url_scheme")]
    pub url_scheme: String,
    /// API host, optionally with a port
    #[serde(default = "default_api_host")]
    pub host: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl ApiConfig {
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

fn default_url_scheme() -> String {
    "http".to_string()
}

fn default_api_host() -> String {
    T411_API_HOST.to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("t411.db")
}

/// Search defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Results requested per search when the query does not say
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

fn default_max_results() -> u32 {
    10
}

/// Sanitized config for display (password redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub api: SanitizedApiConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
}

/// Sanitized API config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedApiConfig {
    pub username: String,
    pub password_configured: bool,
    pub url_scheme: String,
    pub host: String,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            api: SanitizedApiConfig {
                username: config.api.username.clone(),
                password_configured: !config.api.password.is_empty(),
                url_scheme: config.api.url_scheme.clone(),
                host: config.api.host.clone(),
                timeout_secs: config.api.timeout_secs,
            },
            database: config.database.clone(),
            search: config.search.clone(),
        }
    }
}
