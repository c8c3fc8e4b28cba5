//! Backend configuration.
//!
//! Both backends are optional: an unset URL removes that source from the read
//! chain. Override via environment variables or explicit construction for
//! tests.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the claims backends.
///
/// Custom `Debug` implementation redacts the `store_key` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the row store. Tables live under `{store_url}/rest/v1/`.
    pub store_url: Option<Url>,
    /// Row store key, sent as `apikey` and as the bearer token.
    pub store_key: Zeroizing<String>,
    /// Base URL of the secondary REST API. Routes live under `{api_url}/api/v1/`.
    pub api_url: Option<Url>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Serve the bundled sample dataset when every other source fails.
    pub sample_fallback: bool,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("store_url", &self.store_url)
            .field("store_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("sample_fallback", &self.sample_fallback)
            .finish()
    }
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CLAIMS_STORE_URL` (optional)
    /// - `CLAIMS_STORE_KEY` (required when `CLAIMS_STORE_URL` is set)
    /// - `CLAIMS_API_URL` (optional)
    /// - `CLAIMS_TIMEOUT_SECS` (default: 30)
    /// - `CLAIMS_SAMPLE_FALLBACK` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_url = env_opt_url("CLAIMS_STORE_URL")?;
        let store_key = match (&store_url, std::env::var("CLAIMS_STORE_KEY")) {
            (_, Ok(key)) => key,
            (Some(_), Err(_)) => return Err(ConfigError::MissingStoreKey),
            (None, Err(_)) => String::new(),
        };

        Ok(Self {
            store_url,
            store_key: Zeroizing::new(store_key),
            api_url: env_opt_url("CLAIMS_API_URL")?,
            timeout_secs: std::env::var("CLAIMS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            sample_fallback: match std::env::var("CLAIMS_SAMPLE_FALLBACK") {
                Ok(raw) => parse_flag("CLAIMS_SAMPLE_FALLBACK", &raw)?,
                Err(_) => false,
            },
        })
    }

    /// Configuration pointing at local mock servers: the row store on
    /// `base_port` and the REST API on `base_port + 1`.
    pub fn local_mock(base_port: u16, key: &str) -> Result<Self, ConfigError> {
        let make_url = |port: u16| -> Result<Url, ConfigError> {
            Url::parse(&format!("http://127.0.0.1:{port}"))
                .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))
        };
        Ok(Self {
            store_url: Some(make_url(base_port)?),
            store_key: Zeroizing::new(key.to_string()),
            api_url: Some(make_url(base_port + 1)?),
            timeout_secs: 5,
            sample_fallback: false,
        })
    }
}

fn env_opt_url(var: &str) -> Result<Option<Url>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) if !raw.trim().is_empty() => Url::parse(raw.trim())
            .map(Some)
            .map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string())),
        _ => Ok(None),
    }
}

fn parse_flag(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag(var.to_string(), raw.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CLAIMS_STORE_KEY is required when CLAIMS_STORE_URL is set")]
    MissingStoreKey,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid boolean for {0}: {1:?}")]
    InvalidFlag(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = BackendConfig::local_mock(9000, "anon-key").unwrap();
        assert_eq!(cfg.store_key.as_str(), "anon-key");
        assert_eq!(cfg.timeout_secs, 5);
        assert!(!cfg.sample_fallback);
        assert_eq!(cfg.store_url.unwrap().as_str(), "http://127.0.0.1:9000/");
        assert_eq!(cfg.api_url.unwrap().as_str(), "http://127.0.0.1:9001/");
    }

    #[test]
    fn debug_redacts_key() {
        let cfg = BackendConfig::local_mock(9000, "super-secret").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn env_opt_url_absent_is_none() {
        assert!(env_opt_url("NONEXISTENT_CLAIMS_VAR_12345").unwrap().is_none());
    }

    #[test]
    fn env_opt_url_rejects_invalid_url() {
        std::env::set_var("TEST_BAD_URL_CLAIMS", "not a url");
        let result = env_opt_url("TEST_BAD_URL_CLAIMS");
        std::env::remove_var("TEST_BAD_URL_CLAIMS");
        assert!(matches!(result, Err(ConfigError::InvalidUrl(..))));
    }

    #[test]
    fn flags() {
        assert!(parse_flag("X", "true").unwrap());
        assert!(parse_flag("X", " YES ").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
