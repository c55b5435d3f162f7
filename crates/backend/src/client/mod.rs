//! REST client for the hosted backend.
//!
//! The backend exposes three surfaces under one project URL:
//!
//! - `/rest/v1/{table}` - table access with `PostgREST` filter syntax
//! - `/auth/v1/*` - managed authentication
//! - `/storage/v1/object/*` - object storage
//!
//! Every request carries the anonymous key as `apikey`. Table and storage
//! requests authenticate with the service key when one is configured.
//! Product reads are cached with `moka` (5-minute TTL) and the cache is
//! dropped whenever a product is written through this client.

mod auth;
mod cache;
mod storage;
mod tables;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::BackendConfig;
use crate::error::BackendError;

use cache::{CacheKey, CacheValue};

/// Longest slice of a response body written to logs.
const LOG_BODY_LIMIT: usize = 500;

/// Client for the hosted backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    table_key: SecretString,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let table_key = config
            .service_key
            .clone()
            .unwrap_or_else(|| config.anon_key.clone());

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
                anon_key: config.anon_key.clone(),
                table_key,
                cache,
            }),
        }
    }

    /// Project base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build a URL under the project with query parameters.
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&format!("{}/{path}", self.inner.base_url))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Request against a table, authenticated with the table key.
    fn rest(
        &self,
        method: Method,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(&format!("rest/v1/{table}"), query)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.table_key.expose_secret()))
    }

    /// Request against the auth service, authenticated with the anon key.
    fn auth_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(&format!("auth/v1/{path}"), query)?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret()))
    }

    /// Request against object storage, authenticated with the table key.
    fn storage_request(&self, method: Method, path: &str) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(&format!("storage/v1/{path}"), &[])?;
        Ok(self
            .inner
            .client
            .request(method, url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(self.inner.table_key.expose_secret()))
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Backend returned non-success status"
            );
            let message = error_message(&body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    BackendError::Unauthorized(message)
                }
                StatusCode::NOT_FOUND => BackendError::NotFound(message),
                _ => BackendError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, LOG_BODY_LIMIT),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn invalidate_products(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

/// First `limit` characters of `s`.
fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}

/// Pull a readable message out of an error body.
///
/// The table, auth and storage services each use a different field name.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .into_iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| truncate(body, 200))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> BackendClient {
        let config =
            BackendConfig::new("https://proj.example.co", SecretString::from("anon")).unwrap();
        BackendClient::new(&config)
    }

    #[test]
    fn test_endpoint_encodes_filters() {
        let url = client()
            .endpoint(
                "rest/v1/products",
                &[("category", "eq.Art & Design"), ("order", "created_at.desc")],
            )
            .unwrap();
        assert_eq!(url.path(), "/rest/v1/products");
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("category".to_string(), "eq.Art & Design".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_url_has_no_trailing_slash() {
        assert_eq!(client().base_url(), "https://proj.example.co");
    }

    #[test]
    fn test_error_message_fields() {
        assert_eq!(error_message(r#"{"message":"duplicate key"}"#), "duplicate key");
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message("plain text"), "plain text");
    }
}
