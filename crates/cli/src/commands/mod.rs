//! CLI command implementations.

pub mod orders;
pub mod seed;

use neobazaar_backend::{Backend, BackendConfig};
use secrecy::SecretString;

/// Connect to the hosted backend from `BACKEND_*` environment variables.
///
/// The CLI writes products and orders, so the service key is required.
///
/// # Errors
///
/// Returns an error if a variable is missing or the URL is invalid.
pub fn backend_from_env() -> Result<Backend, Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let url = required_env("BACKEND_URL")?;
    let anon_key = SecretString::from(required_env("BACKEND_ANON_KEY")?);
    let service_key = SecretString::from(required_env("BACKEND_SERVICE_KEY")?);

    let config = BackendConfig::new(&url, anon_key)?.with_service_key(Some(service_key));
    Ok(Backend::from_config(Some(&config)))
}

fn required_env(key: &str) -> Result<String, String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| format!("{key} not set"))
}
