//! Shared HTTP client, SSE parsing, and header utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::RoundtableError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map an HTTP error status to a typed error.
pub fn status_to_error(status: u16, body: &str) -> RoundtableError {
    match status {
        401 | 403 => RoundtableError::Authentication(body.to_string()),
        429 => RoundtableError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => RoundtableError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    // Try to parse retry-after from JSON error body
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sse_data_strips_prefix() {
        assert_eq!(parse_sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
    }

    #[test]
    fn parse_sse_data_done_is_none() {
        assert_eq!(parse_sse_data("data: [DONE]"), None);
    }

    #[test]
    fn parse_sse_data_ignores_other_lines() {
        assert_eq!(parse_sse_data(": comment"), None);
        assert_eq!(parse_sse_data("event: ping"), None);
    }

    #[test]
    fn status_401_maps_to_authentication() {
        assert!(matches!(
            status_to_error(401, "no key"),
            RoundtableError::Authentication(_)
        ));
    }

    #[test]
    fn status_429_extracts_retry_after() {
        let err = status_to_error(429, r#"{"error":{"retry_after":1.5}}"#);
        match err {
            RoundtableError::RateLimited { retry_after_ms } => {
                assert_eq!(retry_after_ms, Some(1500));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }
}
