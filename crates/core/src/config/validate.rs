use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - API section exists (enforced by serde)
/// - URL scheme is http or https
/// - API host is not empty
/// - Timeout and search result count are not 0
///
/// Credentials may be empty here: they can be supplied at runtime.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !matches!(config.api.url_scheme.as_str(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "api.url_scheme must be \"http\" or \"https\", got \"{}\"",
            config.api.url_scheme
        )));
    }

    if config.api.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "api.host cannot be empty".to_string(),
        ));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.search.max_results == 0 {
        return Err(ConfigError::ValidationError(
            "search.max_results cannot be 0".to_string(),
        ));
    }

    Ok(())
}
