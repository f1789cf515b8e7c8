//! Configuration loading.
//!
//! The TOML file holds the `[api]`, `[database]` and `[search]` sections.
//! Environment variables prefixed with `T411_` override it, with `__`
//! separating the section from the key: `T411_API__PASSWORD` sets
//! `api.password`, `T411_DATABASE__PATH` sets `database.path`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of the environment variables that override the file.
const ENV_PREFIX: &str = "T411_";

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Read the T411 configuration file, then apply `T411_*` overrides.
///
/// A missing file is [`ConfigError::FileNotFound`], even if the environment
/// alone would be enough.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    figment_for(path)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse a configuration from TOML text, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
