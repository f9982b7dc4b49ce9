//! Telegram Bot API adapter.
//!
//! Implements `ChatMessenger` with `sendMessage`. The bot token is part of
//! the request URL, so transport errors are stripped of their URL before
//! they are logged or returned.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatMessenger;

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramBotApi {
    api_base_url: String,
    http_client: reqwest::Client,
}

impl TelegramBotApi {
    pub fn new(api_base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::upstream(format!("Failed to build Telegram client: {}", e)))?;

        Ok(Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn method_url(&self, bot_token: &SecretString, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base_url,
            bot_token.expose_secret(),
            method
        )
    }
}

#[async_trait]
impl ChatMessenger for TelegramBotApi {
    async fn send_message(
        &self,
        bot_token: &SecretString,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), DomainError> {
        let payload = SendMessageRequest {
            chat_id: chat_id.value(),
            text,
            parse_mode: Some("Markdown"),
        };

        let response = self
            .http_client
            .post(self.method_url(bot_token, "sendMessage"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::upstream(e.without_url().to_string()))?;

        let status = response.status();
        let body: TelegramResponse = response
            .json()
            .await
            .map_err(|e| DomainError::upstream(e.without_url().to_string()))?;

        if !body.ok {
            let description = body
                .description
                .unwrap_or_else(|| "Unknown Telegram API error".to_string());
            tracing::error!(
                chat_id = chat_id.value(),
                status = status.as_u16(),
                error = %description,
                "Telegram sendMessage failed"
            );
            return Err(DomainError::upstream(description)
                .with_detail("chat_id", chat_id.to_string()));
        }

        tracing::debug!(chat_id = chat_id.value(), "Telegram message sent");
        Ok(())
    }
}
