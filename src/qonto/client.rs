//! Qonto API client
//!
//! HTTP client for the Qonto third-party REST API (`/v2`).

use crate::auth::{ApiKeyAuth, AuthError};
use crate::config::RuntimeConfig;
use crate::qonto::QueryParams;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

/// Header enabling the Qonto sandbox
pub const STAGING_TOKEN_HEADER: &str = "x-qonto-staging-token";

/// Qonto client errors
#[derive(Error, Debug)]
pub enum QontoError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized (401): {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited (429): retry after {0} seconds")]
    RateLimited(u64),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Qonto API error ({0}): {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Qonto REST client
#[derive(Debug)]
pub struct QontoClient {
    base_url: Url,
    http_client: Client,
    max_retries: u32,
    retry_delay_ms: u64,
    sandbox: bool,
}

impl QontoClient {
    /// Create a new Qonto client
    ///
    /// # Arguments
    /// * `auth` - API key credentials, sent on every request
    /// * `config` - validated runtime configuration (base URL, timeouts, retries)
    pub fn new(auth: &ApiKeyAuth, config: &RuntimeConfig) -> Result<Self, QontoError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| QontoError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(QontoError::InvalidUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth.header_value()?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("qonto-mcp-server/", env!("CARGO_PKG_VERSION"))),
        );

        if let Some(ref token) = config.staging_token {
            let mut value = HeaderValue::from_str(token)
                .map_err(|_| QontoError::Auth(AuthError::InvalidHeader))?;
            value.set_sensitive(true);
            headers.insert(STAGING_TOKEN_HEADER, value);
        }

        let http_client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url,
            http_client,
            max_retries: config.max_retries.max(1),
            retry_delay_ms: config.retry_delay_ms,
            sandbox: config.staging_token.is_some(),
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn is_sandbox(&self) -> bool {
        self.sandbox
    }

    /// Resolve path segments against the base URL.
    ///
    /// Each segment is percent-encoded on its own, so an identifier
    /// containing `/` or `?` stays inside its segment.
    pub fn endpoint_url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, QontoError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| QontoError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments.iter().map(AsRef::as_ref));
        Ok(url)
    }

    /// GET a resource and return its JSON body
    pub async fn get<S: AsRef<str>>(
        &self,
        segments: &[S],
        query: &QueryParams,
    ) -> Result<Value, QontoError> {
        let url = self.endpoint_url(segments)?;

        tracing::debug!("Fetching: {}{}", url, query.to_display_string());

        let response = self.execute_with_retry(&url, query).await?;
        let status = response.status();

        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!("Empty body with status {}", status);
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| QontoError::Parse(format!("Failed to parse Qonto response: {}", e)))
    }

    /// Execute a GET request with retry on 429 and 5xx responses
    async fn execute_with_retry(
        &self,
        url: &Url,
        query: &QueryParams,
    ) -> Result<Response, QontoError> {
        let mut attempt = 0;
        let mut delay = self.retry_delay_ms;

        loop {
            attempt += 1;

            let mut request = self.http_client.get(url.clone());
            if !query.is_empty() {
                request = request.query(query);
            }
            let response = request.send().await?;

            match response.status() {
                status if status.is_success() => {
                    return Ok(response);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get(RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.trim().parse::<u64>().ok())
                        .unwrap_or(delay / 1000);

                    if attempt >= self.max_retries {
                        return Err(QontoError::RateLimited(retry_after));
                    }

                    tracing::warn!(
                        "Rate limited (429), attempt {}/{}, retrying after {} seconds",
                        attempt,
                        self.max_retries,
                        retry_after
                    );

                    sleep(Duration::from_secs(retry_after)).await;
                    delay = delay.saturating_mul(2);
                }
                StatusCode::UNAUTHORIZED => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(QontoError::Unauthorized(extract_error_message(&body)));
                }
                StatusCode::NOT_FOUND => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(QontoError::NotFound(extract_error_message(&body)));
                }
                status if status.is_server_error() => {
                    if attempt >= self.max_retries {
                        let body = response.text().await.unwrap_or_default();
                        return Err(QontoError::ServerError(
                            status.as_u16(),
                            extract_error_message(&body),
                        ));
                    }

                    tracing::warn!(
                        "Server error ({}), attempt {}/{}, retrying...",
                        status,
                        attempt,
                        self.max_retries
                    );

                    sleep(Duration::from_millis(delay)).await;
                    delay = delay.saturating_mul(2);
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(QontoError::Api(status.as_u16(), extract_error_message(&body)));
                }
            }
        }
    }
}

/// Pull a readable message out of a Qonto error body.
///
/// Qonto answers with `{"errors": [{"code": ..., "detail": ...}]}` on most
/// endpoints and `{"message": ...}` on a few; anything else is returned as-is.
pub fn extract_error_message(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response body)".to_string();
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return trimmed.to_string();
    };

    if let Some(errors) = json.get("errors").and_then(Value::as_array) {
        let messages: Vec<String> = errors
            .iter()
            .filter_map(|err| {
                let code = err.get("code").and_then(Value::as_str);
                let detail = err
                    .get("detail")
                    .or_else(|| err.get("message"))
                    .and_then(Value::as_str);
                match (code, detail) {
                    (Some(c), Some(d)) => Some(format!("{}: {}", c, d)),
                    (None, Some(d)) => Some(d.to_string()),
                    (Some(c), None) => Some(c.to_string()),
                    (None, None) => None,
                }
            })
            .collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    for key in ["message", "error", "detail"] {
        if let Some(message) = json.get(key).and_then(Value::as_str) {
            return message.to_string();
        }
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime_config(base_url: &str) -> RuntimeConfig {
        RuntimeConfig {
            api_identifier: "acme-1234".to_string(),
            api_secret_key: "secret".to_string(),
            base_url: base_url.to_string(),
            staging_token: None,
            timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_delay_ms: 1,
        }
    }

    fn client(base_url: &str) -> QontoClient {
        let config = runtime_config(base_url);
        let auth = ApiKeyAuth::from_config(&config).unwrap();
        QontoClient::new(&auth, &config).unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        let client = client("https://thirdparty.qonto.com/v2");
        let url = client.endpoint_url(&["transactions", "abc", "attachments"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://thirdparty.qonto.com/v2/transactions/abc/attachments"
        );
    }

    #[test]
    fn test_endpoint_url_trailing_slash() {
        let client = client("https://thirdparty.qonto.com/v2/");
        let url = client.endpoint_url(&["labels"]).unwrap();
        assert_eq!(url.as_str(), "https://thirdparty.qonto.com/v2/labels");
    }

    #[test]
    fn test_endpoint_url_encodes_segments() {
        let client = client("https://thirdparty.qonto.com/v2");
        let url = client.endpoint_url(&["beneficiaries", "abc/def?x=1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://thirdparty.qonto.com/v2/beneficiaries/abc%2Fdef%3Fx=1"
        );
    }

    #[test]
    fn test_sandbox_flag() {
        let mut config = runtime_config("https://thirdparty-sandbox.staging.qonto.co/v2");
        config.staging_token = Some("token".to_string());
        let auth = ApiKeyAuth::from_config(&config).unwrap();
        let client = QontoClient::new(&auth, &config).unwrap();
        assert!(client.is_sandbox());
    }

    #[test]
    fn test_extract_error_message_errors_array() {
        let body = r#"{"errors":[{"code":"not_found","detail":"Beneficiary not found"}]}"#;
        assert_eq!(
            extract_error_message(body),
            "not_found: Beneficiary not found"
        );
    }

    #[test]
    fn test_extract_error_message_multiple() {
        let body = r#"{"errors":[{"detail":"per_page is invalid"},{"code":"invalid_sort"}]}"#;
        assert_eq!(
            extract_error_message(body),
            "per_page is invalid; invalid_sort"
        );
    }

    #[test]
    fn test_extract_error_message_fallbacks() {
        assert_eq!(extract_error_message(r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(extract_error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(extract_error_message("  "), "(empty response body)");
        assert_eq!(extract_error_message(r#"{"foo":1}"#), r#"{"foo":1}"#);
    }
}
