//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `TICKETLIVE_API_URL` - Base URL of the backend API (default:
//!   `http://localhost:3001`)
//! - `TICKETLIVE_AUTH_MODE` - `bearer` (token header) or `cookie`
//!   (default: `bearer`; some deployments authenticate with a session
//!   cookie instead of a bearer token)
//! - `TICKETLIVE_STORAGE_PATH` - Path of the local storage file (default:
//!   `.ticketlive/storage.json`)

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// How requests to authenticated collaborator endpoints carry credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// A bearer token, persisted under its own storage key and sent in the
    /// `Authorization` header.
    #[default]
    Bearer,
    /// A session cookie managed by the HTTP client's cookie store; no token
    /// is ever persisted.
    Cookie,
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the backend API.
    pub api_url: Url,
    /// Credential transport for authenticated endpoints.
    pub auth_mode: AuthMode,
    /// Path of the local storage file (the browser-storage stand-in).
    pub storage_path: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_api_url(&get_env_or_default(
            "TICKETLIVE_API_URL",
            "http://localhost:3001",
        ))?;
        let auth_mode = parse_auth_mode(&get_env_or_default("TICKETLIVE_AUTH_MODE", "bearer"))?;
        let storage_path = PathBuf::from(get_env_or_default(
            "TICKETLIVE_STORAGE_PATH",
            ".ticketlive/storage.json",
        ));

        Ok(Self {
            api_url,
            auth_mode,
            storage_path,
        })
    }

    /// The API base URL without a trailing slash, for joining paths.
    #[must_use]
    pub fn api_base(&self) -> String {
        self.api_url.as_str().trim_end_matches('/').to_owned()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse and validate the API base URL.
fn parse_api_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar("TICKETLIVE_API_URL".to_string(), e.to_string()))?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            "TICKETLIVE_API_URL".to_string(),
            "URL must have a host".to_string(),
        ));
    }

    Ok(url)
}

/// Parse the auth mode name.
fn parse_auth_mode(value: &str) -> Result<AuthMode, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "bearer" | "token" | "header" => Ok(AuthMode::Bearer),
        "cookie" => Ok(AuthMode::Cookie),
        other => Err(ConfigError::InvalidEnvVar(
            "TICKETLIVE_AUTH_MODE".to_string(),
            format!("unknown auth mode '{other}' (expected 'bearer' or 'cookie')"),
        )),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_url_valid() {
        let url = parse_api_url("http://localhost:3001").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(3001));
    }

    #[test]
    fn test_parse_api_url_invalid() {
        let result = parse_api_url("not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_parse_auth_mode() {
        assert_eq!(parse_auth_mode("bearer").unwrap(), AuthMode::Bearer);
        assert_eq!(parse_auth_mode("COOKIE").unwrap(), AuthMode::Cookie);
        assert!(parse_auth_mode("oauth").is_err());
    }

    #[test]
    fn test_api_base_strips_trailing_slash() {
        let config = StorefrontConfig {
            api_url: Url::parse("http://localhost:3001").unwrap(),
            auth_mode: AuthMode::Bearer,
            storage_path: PathBuf::from("storage.json"),
        };
        assert_eq!(config.api_base(), "http://localhost:3001");
    }
}
