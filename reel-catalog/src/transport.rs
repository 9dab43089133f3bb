//! Catalog HTTP transport
//!
//! Single bounded transport used by every catalog call: fixed timeout,
//! credential attached as a query parameter, transport failures mapped to a
//! small caller-safe taxonomy. Raw upstream error bodies are never logged or
//! surfaced, and endpoint paths are redacted before logging.

use reel_common::sanitize::redact_path;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Catalog client errors
///
/// Display strings are caller-safe and may be shown to the user directly.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request timeout - please check your connection")]
    Timeout,

    #[error("Invalid API key")]
    Unauthorized,

    #[error("Too many requests - please try again later")]
    RateLimited,

    #[error("Network error - please check your connection")]
    Network,

    #[error("Catalog request failed (status {0})")]
    Api(u16),

    #[error("Unexpected catalog response")]
    Parse,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Transport seam for catalog requests
///
/// The production implementation is [`HttpTransport`]; tests substitute a
/// recording fake so cache behavior can be observed without a network.
#[allow(async_fn_in_trait)]
pub trait Transport: Send + Sync {
    /// Issue a GET for `path` with the given query parameters
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, CatalogError>;
}

/// HTTP transport over reqwest
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|_| CatalogError::Network)?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, path: &str, params: &[(String, String)]) -> Result<Value, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!(path = %redact_path(path), "catalog request");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            401 => return Err(CatalogError::Unauthorized),
            429 => return Err(CatalogError::RateLimited),
            code => {
                // Body intentionally dropped: upstream error text stays out of logs
                tracing::warn!(path = %redact_path(path), status = code, "catalog request failed");
                return Err(CatalogError::Api(code));
            }
        }

        response.json().await.map_err(|_| CatalogError::Parse)
    }
}

fn map_request_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout
    } else if e.is_connect() {
        CatalogError::Network
    } else {
        CatalogError::Api(e.status().map(|s| s.as_u16()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// Serve exactly one canned HTTP response on a loopback port
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{addr}")
    }

    async fn get(base: &str) -> Result<Value, CatalogError> {
        let transport = HttpTransport::new(base, "key", Duration::from_secs(2)).unwrap();
        transport.get("/trending/all/day", &[]).await
    }

    #[tokio::test]
    async fn success_body_parses_as_json() {
        let base = serve_once("200 OK", r#"{"page":1,"results":[]}"#);
        let value = get(&base).await.unwrap();
        assert_eq!(value["page"], 1);
    }

    #[tokio::test]
    async fn unauthorized_maps_to_invalid_key() {
        let base = serve_once("401 Unauthorized", "");
        assert!(matches!(get(&base).await, Err(CatalogError::Unauthorized)));
    }

    #[tokio::test]
    async fn rate_limit_maps_to_retry_later() {
        let base = serve_once("429 Too Many Requests", "");
        assert!(matches!(get(&base).await, Err(CatalogError::RateLimited)));
    }

    #[tokio::test]
    async fn other_statuses_carry_the_code_without_the_body() {
        let base = serve_once("503 Service Unavailable", "upstream detail text");
        match get(&base).await {
            Err(CatalogError::Api(503)) => {}
            other => panic!("expected Api(503), got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_parse_error() {
        let base = serve_once("200 OK", "<html>maintenance page</html>");
        assert!(matches!(get(&base).await, Err(CatalogError::Parse)));
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network() {
        // Bind then drop to find a loopback port with nothing listening
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let base = format!("http://{addr}");
        assert!(matches!(get(&base).await, Err(CatalogError::Network)));
    }

    #[tokio::test]
    async fn stalled_response_maps_to_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                std::thread::sleep(Duration::from_millis(500));
                drop(stream);
            }
        });
        let transport = HttpTransport::new(
            &format!("http://{addr}"),
            "key",
            Duration::from_millis(100),
        )
        .unwrap();
        let result = transport.get("/trending/all/day", &[]).await;
        assert!(matches!(result, Err(CatalogError::Timeout)));
    }
}
