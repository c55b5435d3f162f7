//! Connection settings for the hosted backend.

use secrecy::SecretString;
use url::Url;

/// Hosted backend connection configuration.
///
/// Implements `Debug` manually to redact keys.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abc.example.co`
    pub url: Url,
    /// Public anonymous key, sent as `apikey` on every request
    pub anon_key: SecretString,
    /// Privileged key for server-side table access. Falls back to the anon key.
    pub service_key: Option<SecretString>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field(
                "service_key",
                &self.service_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl BackendConfig {
    /// Build a configuration from a project URL and anonymous key.
    ///
    /// # Errors
    ///
    /// Returns an error if `url` is not a valid absolute URL.
    pub fn new(url: &str, anon_key: SecretString) -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse(url.trim_end_matches('/'))?,
            anon_key,
            service_key: None,
        })
    }

    /// Use a privileged key for table access.
    #[must_use]
    pub fn with_service_key(mut self, service_key: Option<SecretString>) -> Self {
        self.service_key = service_key;
        self
    }
}
