//! Qonto API key authentication
//!
//! The third-party API authenticates every request with an
//! `Authorization: {login}:{secret_key}` header. There is no token exchange,
//! so nothing needs caching.

use crate::config::RuntimeConfig;
use reqwest::header::HeaderValue;
use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Credentials contain characters not allowed in an HTTP header")]
    InvalidHeader,
}

/// API key credentials for the Qonto third-party API
#[derive(Clone)]
pub struct ApiKeyAuth {
    login: String,
    secret_key: String,
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("login", &self.login)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl ApiKeyAuth {
    /// Create credentials from the organization login and its secret key
    pub fn new(login: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, AuthError> {
        let login = login.into();
        let secret_key = secret_key.into();

        if login.trim().is_empty() {
            return Err(AuthError::MissingCredentials("login".to_string()));
        }
        if secret_key.trim().is_empty() {
            return Err(AuthError::MissingCredentials("secret key".to_string()));
        }

        Ok(Self { login, secret_key })
    }

    pub fn from_config(config: &RuntimeConfig) -> Result<Self, AuthError> {
        Self::new(config.api_identifier.clone(), config.api_secret_key.clone())
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    /// Build the `Authorization` header value, marked sensitive so it is
    /// left out of reqwest's debug output.
    pub fn header_value(&self) -> Result<HeaderValue, AuthError> {
        let mut value = HeaderValue::from_str(&format!("{}:{}", self.login, self.secret_key))
            .map_err(|_| AuthError::InvalidHeader)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_value() {
        let auth = ApiKeyAuth::new("acme-corp-1234", "abcdef").unwrap();
        let header = auth.header_value().unwrap();
        assert_eq!(header.to_str().unwrap(), "acme-corp-1234:abcdef");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert!(matches!(
            ApiKeyAuth::new("", "secret"),
            Err(AuthError::MissingCredentials(_))
        ));
        assert!(matches!(
            ApiKeyAuth::new("login", "   "),
            Err(AuthError::MissingCredentials(_))
        ));
    }

    #[test]
    fn test_invalid_header_characters() {
        let auth = ApiKeyAuth::new("login", "bad\nsecret").unwrap();
        assert!(matches!(auth.header_value(), Err(AuthError::InvalidHeader)));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let auth = ApiKeyAuth::new("acme", "top-secret").unwrap();
        let debug = format!("{:?}", auth);
        assert!(debug.contains("acme"));
        assert!(!debug.contains("top-secret"));
    }
}
