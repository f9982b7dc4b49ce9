//! Recording messenger for tests.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::ChatMessenger;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub bot_token: String,
    pub chat_id: ChatId,
    pub text: String,
}

/// Captures every outbound message instead of calling Telegram.
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<SentMessage>>,
    fail: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail like an unreachable Bot API.
    pub fn fail_sends(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, chat_id: ChatId) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChatMessenger for RecordingMessenger {
    async fn send_message(
        &self,
        bot_token: &SecretString,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), DomainError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::upstream("telegram unavailable"));
        }

        self.sent.lock().await.push(SentMessage {
            bot_token: bot_token.expose_secret().clone(),
            chat_id,
            text: text.to_string(),
        });
        Ok(())
    }
}
