//! Server configuration.
//!
//! Everything comes from the process environment, optionally seeded from a
//! local `.env` file by `main`. Missing variables fall back to defaults that
//! suit a developer checkout; malformed values are errors.

use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_APP_ENV: &str = "development";

/// The only environment in which the admin content API answers.
const ADMIN_ENV: &str = "development";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("CONTENT_DIR must not be empty")]
    EmptyContentDir,
    #[error("APP_ENV must not be empty")]
    EmptyAppEnv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub content_dir: PathBuf,
    pub app_env: String,
}

impl ServerConfig {
    /// Read `PORT`, `CONTENT_DIR` and `APP_ENV`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_values(
            env_var("PORT").as_deref(),
            env_var("CONTENT_DIR").as_deref(),
            env_var("APP_ENV").as_deref(),
        )
    }

    fn from_values(port: Option<&str>, content_dir: Option<&str>, app_env: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            port: parse_port(port)?,
            content_dir: parse_content_dir(content_dir)?,
            app_env: parse_app_env(app_env)?,
        })
    }

    #[must_use]
    pub fn admin_enabled(&self) -> bool {
        self.app_env == ADMIN_ENV
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_port(raw: Option<&str>) -> Result<u16, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_PORT),
        Some(value) => value
            .parse()
            .map_err(|source| ConfigError::InvalidPort { value: value.to_owned(), source }),
    }
}

fn parse_content_dir(raw: Option<&str>) -> Result<PathBuf, ConfigError> {
    match raw {
        None => Ok(PathBuf::from(DEFAULT_CONTENT_DIR)),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyContentDir),
        Some(value) => Ok(PathBuf::from(value.trim())),
    }
}

fn parse_app_env(raw: Option<&str>) -> Result<String, ConfigError> {
    match raw {
        None => Ok(DEFAULT_APP_ENV.to_owned()),
        Some(value) if value.trim().is_empty() => Err(ConfigError::EmptyAppEnv),
        Some(value) => Ok(value.trim().to_owned()),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
