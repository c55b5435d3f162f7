//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `BACKEND_URL` - Hosted backend project URL
//! - `BACKEND_ANON_KEY` - Hosted backend anonymous key
//! - `BACKEND_SERVICE_KEY` - Privileged key for server-side table access
//! - `ADMIN_EMAIL` - Email that receives the admin role on first profile creation
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//!
//! Without `BACKEND_URL` and `BACKEND_ANON_KEY` the storefront still starts:
//! catalog reads come back empty and every write is rejected.
//!
//! Empty values are treated as unset.

use std::net::{IpAddr, SocketAddr};

use neobazaar_backend::BackendConfig;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Hosted backend connection; `None` runs unconfigured
    pub backend: Option<BackendConfig>,
    /// Address granted the admin role on first profile creation
    pub admin_email: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if a backend key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;

        Ok(Self {
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            backend: backend_from_env()?,
            admin_email: get_optional_env("ADMIN_EMAIL"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS (controls the secure cookie flag).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Where password reset emails send the shopper.
    #[must_use]
    pub fn password_reset_url(&self) -> String {
        format!("{}/reset-password", self.base_url)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Backend settings, or `None` when URL or anon key is unset.
fn backend_from_env() -> Result<Option<BackendConfig>, ConfigError> {
    let (Some(url), Some(anon_key)) = (
        get_optional_env("BACKEND_URL"),
        get_optional_env("BACKEND_ANON_KEY"),
    ) else {
        tracing::warn!("BACKEND_URL or BACKEND_ANON_KEY not set; running without a backend");
        return Ok(None);
    };

    let anon_key = validated_secret("BACKEND_ANON_KEY", anon_key)?;
    let service_key = get_optional_env("BACKEND_SERVICE_KEY")
        .map(|key| validated_secret("BACKEND_SERVICE_KEY", key))
        .transpose()?;

    BackendConfig::new(&url, anon_key)
        .map(|config| Some(config.with_service_key(service_key)))
        .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    get_optional_env(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Reject secrets that look like template placeholders.
fn validate_secret_strength(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.expose_secret().to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

fn validated_secret(var_name: &str, value: String) -> Result<SecretString, ConfigError> {
    let secret = SecretString::from(value);
    validate_secret_strength(&secret, var_name)?;
    Ok(secret)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            backend: None,
            admin_email: None,
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_placeholder_key_rejected() {
        let result = validate_secret_strength(
            &SecretString::from("your-anon-key-here"),
            "BACKEND_ANON_KEY",
        );
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_real_looking_key_accepted() {
        let key = SecretString::from("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.eyJyb2xlIjoiYW5vbiJ9.k3Y");
        assert!(validate_secret_strength(&key, "BACKEND_ANON_KEY").is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let addr = config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_password_reset_url() {
        assert_eq!(
            config().password_reset_url(),
            "http://localhost:3000/reset-password"
        );
    }
}
