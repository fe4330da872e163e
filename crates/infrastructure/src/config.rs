//! Client configuration.
//!
//! Settings come from environment variables:
//! - `CLUBHUB_API_URL`: API root (default `http://localhost:5000/api`)
//! - `CLUBHUB_TOKEN_PATH`: token file (default `<config dir>/clubhub/tokens.json`)
//! - `CLUBHUB_TIMEOUT_SECS`: request timeout in seconds (default 30)

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Default API root.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API URL does not parse.
    #[error("invalid CLUBHUB_API_URL {value:?}: {source}")]
    InvalidUrl {
        /// The rejected value.
        value: String,
        /// Parser error.
        source: url::ParseError,
    },

    /// The API URL is not http(s).
    #[error("CLUBHUB_API_URL must use http or https, got {0}")]
    UnsupportedScheme(String),

    /// The timeout is not a positive integer.
    #[error("invalid CLUBHUB_TIMEOUT_SECS {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),

    /// Could not determine config directory.
    #[error("could not determine config directory; set CLUBHUB_TOKEN_PATH")]
    NoConfigDir,
}

/// Runtime settings of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root the auth endpoints hang off.
    pub api_url: Url,
    /// Where the token pair is persisted.
    pub token_path: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("CLUBHUB_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidUrl {
            value: raw_url.clone(),
            source,
        })?;
        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(api_url.scheme().to_string()));
        }

        let token_path = match lookup("CLUBHUB_TOKEN_PATH").filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => Self::default_token_path().ok_or(ConfigError::NoConfigDir)?,
        };

        let timeout = match lookup("CLUBHUB_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url,
            token_path,
            timeout,
        })
    }

    /// Returns `<config dir>/clubhub/tokens.json`, if a config dir exists.
    #[must_use]
    pub fn default_token_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clubhub").join("tokens.json"))
    }
}
