//! Telegram Bot API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Timeout for outbound `sendMessage` calls
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

impl TelegramConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.api_base_url.starts_with("https://") && !self.api_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidUrl("TELEGRAM__API_BASE_URL"));
        }
        Ok(())
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_config_defaults() {
        let config = TelegramConfig::default();
        assert_eq!(config.api_base_url, "https://api.telegram.org");
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = TelegramConfig {
            api_base_url: "api.telegram.org".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
