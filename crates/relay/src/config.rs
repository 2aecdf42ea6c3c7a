//! Process-level settings read from the environment

use getstocks::config::env_or;
use getstocks::types::de::parse_flag;
use getstocks::ConfigError;
use std::net::SocketAddr;
use std::time::Duration;
use telegram::constants::{DEFAULT_MAX_INPUT_LINKS, DEFAULT_SELECTION_TTL};
use telegram::{ChatSettings, WebhookSettings};
use url::Url;

const DEFAULT_WEBHOOK_PORT: u16 = 8443;
const DEFAULT_WEB_HOST: &str = "0.0.0.0";
const DEFAULT_WEB_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub telegram_enabled: bool,
    pub webhook: Option<WebhookSettings>,
    pub chat: ChatSettings,
    pub web_enabled: bool,
    pub web_host: String,
    pub web_port: u16,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_addr = env_or("TELEGRAM_WEBHOOK_ADDR", default_webhook_addr())?;
        let webhook = webhook_settings(std::env::var("TELEGRAM_WEBHOOK_URL").ok(), webhook_addr)?;

        let max_links = at_least_one("MAX_INPUT_LINKS", env_or("MAX_INPUT_LINKS", DEFAULT_MAX_INPUT_LINKS)?)?;
        let selection_ttl = at_least_one(
            "SELECTION_TTL_SECS",
            env_or("SELECTION_TTL_SECS", DEFAULT_SELECTION_TTL.as_secs())?,
        )?;

        Ok(Self {
            telegram_enabled: env_flag("TELEGRAM_ENABLED", true)?,
            webhook,
            chat: ChatSettings {
                max_links,
                selection_ttl: Duration::from_secs(selection_ttl),
                ..ChatSettings::default()
            },
            web_enabled: env_flag("WEB_ENABLED", true)?,
            web_host: env_or("WEB_HOST", DEFAULT_WEB_HOST.to_string())?,
            web_port: env_or("WEB_PORT", DEFAULT_WEB_PORT)?,
        })
    }
}

fn default_webhook_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_WEBHOOK_PORT))
}

/// Reject a zero count or lifetime
fn at_least_one<T: PartialEq + From<u8>>(key: &'static str, value: T) -> Result<T, ConfigError> {
    if value == T::from(0) {
        return Err(ConfigError::Invalid {
            key,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

/// Read a boolean switch such as `WEB_ENABLED=false`
fn env_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_flag(&raw).ok_or(ConfigError::Invalid {
            key,
            reason: format!("expected true or false, got {:?}", raw),
        }),
        _ => Ok(default),
    }
}

fn webhook_settings(url: Option<String>, address: SocketAddr) -> Result<Option<WebhookSettings>, ConfigError> {
    let Some(raw) = url.filter(|u| !u.trim().is_empty()) else {
        return Ok(None);
    };
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        key: "TELEGRAM_WEBHOOK_URL",
        reason: e.to_string(),
    })?;
    Ok(Some(WebhookSettings { url, address }))
}
