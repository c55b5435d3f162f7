//! Request ID middleware for request tracing and correlation.
//!
//! An upstream `x-request-id` is reused when it is short and printable;
//! otherwise a UUID v4 is generated. The id is recorded on the current span,
//! tagged on the Sentry scope and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request id that is trusted.
const MAX_REQUEST_ID_LEN: usize = 128;

fn upstream_id(request: &Request) -> Option<String> {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map(String::from)
}

/// Middleware that ensures every request has a request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = upstream_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request_with(id: &str) -> Request {
        Request::builder()
            .header(REQUEST_ID_HEADER, id)
            .body(axum::body::Body::empty())
            .unwrap()
    }

    #[test]
    fn test_upstream_id_reused() {
        assert_eq!(upstream_id(&request_with("abc-123")).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_oversized_or_spaced_id_ignored() {
        assert!(upstream_id(&request_with(&"a".repeat(200))).is_none());
        assert!(upstream_id(&request_with("a b")).is_none());
    }
}
