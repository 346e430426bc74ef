//! Configuration module
//!
//! Layered configuration: built-in defaults, an optional TOML file, then
//! environment variables.

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Production endpoint of the Qonto third-party API
pub const DEFAULT_BASE_URL: &str = "https://thirdparty.qonto.com/v2";

/// File looked up in the working directory when `QONTO_MCP_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "qonto-mcp.toml";

pub const ENV_CONFIG_PATH: &str = "QONTO_MCP_CONFIG";
pub const ENV_API_IDENTIFIER: &str = "QONTO_API_IDENTIFIER";
pub const ENV_API_SECRET_KEY: &str = "QONTO_API_SECRET_KEY";
pub const ENV_BASE_URL: &str = "QONTO_BASE_URL";
pub const ENV_STAGING_TOKEN: &str = "QONTO_STAGING_TOKEN";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    #[error("Invalid base URL '{0}': must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Qonto connection settings (`[qonto]` table)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct QontoSection {
    pub api_identifier: Option<String>,
    pub api_secret_key: Option<String>,
    pub base_url: Option<String>,
    /// Sandbox only
    pub staging_token: Option<String>,
}

impl std::fmt::Debug for QontoSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QontoSection")
            .field("api_identifier", &self.api_identifier)
            .field("api_secret_key", &self.api_secret_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("staging_token", &self.staging_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP behaviour (`[http]` table)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

/// Raw configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub qonto: QontoSection,
    pub http: HttpSection,
}

/// Validated configuration used at runtime
#[derive(Clone)]
pub struct RuntimeConfig {
    pub api_identifier: String,
    pub api_secret_key: String,
    pub base_url: String,
    pub staging_token: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("api_identifier", &self.api_identifier)
            .field("api_secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("staging_token", &self.staging_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

impl Config {
    /// Load configuration from the default locations and the process environment
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(ENV_CONFIG_PATH) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::info!("Loading configuration from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Override file values with environment variables.
    ///
    /// Takes a lookup function so tests do not have to mutate the process
    /// environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_API_IDENTIFIER) {
            self.qonto.api_identifier = Some(v);
        }
        if let Some(v) = non_empty(ENV_API_SECRET_KEY) {
            self.qonto.api_secret_key = Some(v);
        }
        if let Some(v) = non_empty(ENV_BASE_URL) {
            self.qonto.base_url = Some(v);
        }
        if let Some(v) = non_empty(ENV_STAGING_TOKEN) {
            self.qonto.staging_token = Some(v);
        }
    }

    /// Validate and convert into a [`RuntimeConfig`]
    pub fn to_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        let api_identifier = required(&self.qonto.api_identifier, ENV_API_IDENTIFIER)?;
        let api_secret_key = required(&self.qonto.api_secret_key, ENV_API_SECRET_KEY)?;

        let base_url = self
            .qonto
            .base_url
            .as_deref()
            .map(str::trim)
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        match Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => return Err(ConfigError::InvalidBaseUrl(base_url)),
        }

        if self.http.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "http.max_retries must be at least 1".to_string(),
            ));
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(RuntimeConfig {
            api_identifier,
            api_secret_key,
            base_url,
            staging_token: self
                .qonto
                .staging_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            timeout: Duration::from_secs(self.http.timeout_secs),
            max_retries: self.http.max_retries,
            retry_delay_ms: self.http.retry_delay_ms,
        })
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or(ConfigError::MissingCredentials(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.retry_delay_ms, 1000);
        assert!(config.qonto.base_url.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml_str(
            r#"
            [qonto]
            api_identifier = "acme-1234"
            api_secret_key = "s3cret"
            base_url = "https://thirdparty-sandbox.staging.qonto.co/v2/"
            staging_token = "stg"

            [http]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.qonto.api_identifier.as_deref(), Some("acme-1234"));
        assert_eq!(config.http.max_retries, 5);
        assert_eq!(config.http.timeout_secs, 30);

        let runtime = config.to_runtime().unwrap();
        assert_eq!(
            runtime.base_url,
            "https://thirdparty-sandbox.staging.qonto.co/v2"
        );
        assert_eq!(runtime.staging_token.as_deref(), Some("stg"));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::from_toml_str(
            r#"
            [qonto]
            api_identifier = "from-file"
            api_secret_key = "file-secret"
            "#,
        )
        .unwrap();

        config.apply_env(env(&[
            (ENV_API_IDENTIFIER, "from-env"),
            (ENV_API_SECRET_KEY, "  "),
        ]));

        let runtime = config.to_runtime().unwrap();
        assert_eq!(runtime.api_identifier, "from-env");
        // blank env values do not clobber the file
        assert_eq!(runtime.api_secret_key, "file-secret");
        assert_eq!(runtime.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_missing_credentials() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_API_IDENTIFIER, "acme-1234")]));

        let err = config.to_runtime().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingCredentials(ENV_API_SECRET_KEY)
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (ENV_API_IDENTIFIER, "acme-1234"),
            (ENV_API_SECRET_KEY, "s3cret"),
            (ENV_BASE_URL, "ftp://example.com"),
        ]));

        assert!(matches!(
            config.to_runtime(),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_zero_retries_rejected() {
        let config = Config::from_toml_str(
            r#"
            [qonto]
            api_identifier = "a"
            api_secret_key = "b"

            [http]
            max_retries = 0
            "#,
        )
        .unwrap();

        assert!(matches!(config.to_runtime(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let err = tokio_test::assert_err!(Config::from_file(Path::new("/definitely/not/here.toml")));
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qonto-mcp.toml");
        std::fs::write(
            &path,
            "[qonto]\napi_identifier = \"acme\"\napi_secret_key = \"key\"\n",
        )
        .unwrap();

        let config = tokio_test::assert_ok!(Config::from_file(&path));
        assert_eq!(config.to_runtime().unwrap().api_identifier, "acme");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (ENV_API_IDENTIFIER, "acme-1234"),
            (ENV_API_SECRET_KEY, "super-secret-value"),
        ]));
        let runtime = config.to_runtime().unwrap();
        let debug = format!("{:?}", runtime);
        assert!(debug.contains("acme-1234"));
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_raw_config_debug_redacts_secrets() {
        let config = Config::from_toml_str(
            r#"
            [qonto]
            api_identifier = "acme-1234"
            api_secret_key = "super-secret-value"
            staging_token = "staging-secret-value"
            "#,
        )
        .unwrap();

        let debug = format!("{:?}", config);
        assert!(debug.contains("acme-1234"));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("staging-secret-value"));
    }
}
