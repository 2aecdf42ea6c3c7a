//! Provider connection settings read from the environment

use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://getstocks.net/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything the API client needs to talk to GetStocks
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/` so endpoint paths join under it
    pub base_url: Url,
    /// Static API token sent as the `token` query parameter
    pub token: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            base_url: with_trailing_slash(base_url),
            token: token.into(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Read `GETSTOCKS_TOKEN`, `GETSTOCKS_BASE_URL` and `GETSTOCKS_TIMEOUT_SECS`
    ///
    /// # Errors
    /// Returns an error if the token is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        let token = std::env::var("GETSTOCKS_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("GETSTOCKS_TOKEN"))?;

        let base_url = match std::env::var("GETSTOCKS_BASE_URL") {
            Ok(raw) => Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                key: "GETSTOCKS_BASE_URL",
                reason: e.to_string(),
            })?,
            Err(_) => Url::parse(DEFAULT_BASE_URL).map_err(|e| ConfigError::Invalid {
                key: "GETSTOCKS_BASE_URL",
                reason: e.to_string(),
            })?,
        };

        let timeout_secs = env_or("GETSTOCKS_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        let mut config = Self::new(base_url, token);
        config.request_timeout = Duration::from_secs(timeout_secs);
        Ok(config)
    }
}

/// Parse an optional environment variable, falling back to `default` when unset
pub fn env_or<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        _ => Ok(default),
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_added() {
        let url = Url::parse("http://localhost:9000/proxy").unwrap();
        let config = ApiConfig::new(url, "t");
        assert_eq!(config.base_url.as_str(), "http://localhost:9000/proxy/");
        assert_eq!(
            config.base_url.join("api/v1/getinfo").unwrap().as_str(),
            "http://localhost:9000/proxy/api/v1/getinfo"
        );
    }

    #[test]
    fn test_default_base_url_untouched() {
        let config = ApiConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap(), "t");
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_or_default_when_unset() {
        let value: u64 = env_or("GETSTOCKS_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(value, 42);
    }
}
