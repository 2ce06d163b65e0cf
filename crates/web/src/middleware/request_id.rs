//! Per-request correlation IDs.
//!
//! Cart posts and the page they redirect to are separate requests; the ID
//! lets the log lines and Sentry events of one of them be found together.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID that is passed through as-is.
const MAX_UPSTREAM_ID_LEN: usize = 128;

/// Pick the ID for a request: a usable `x-request-id` from a reverse proxy,
/// or a fresh UUID v4.
fn resolve_request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_UPSTREAM_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_owned)
}

/// Tag the request span and Sentry scope with the request ID and echo it
/// back in the `x-request-id` response header.
///
/// Must run inside the `TraceLayer` span, which declares the empty
/// `request_id` field this fills in.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(request.headers());

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

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

    fn headers_with_id(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    #[test]
    fn test_upstream_id_is_reused() {
        assert_eq!(resolve_request_id(&headers_with_id("cf-7a1b")), "cf-7a1b");
    }

    #[test]
    fn test_missing_or_unusable_id_is_replaced() {
        let long = "r".repeat(MAX_UPSTREAM_ID_LEN + 1);
        for headers in [HeaderMap::new(), headers_with_id(""), headers_with_id(&long)] {
            let id = resolve_request_id(&headers);
            assert!(Uuid::parse_str(&id).is_ok(), "{id}");
        }
    }
}
