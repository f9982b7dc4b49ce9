//! ChatMessenger port - Outbound Telegram messages.
//!
//! Every send takes the tenant's own bot token. There is no shared or
//! global token, which keeps egress tenant-isolated.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::domain::foundation::{ChatId, DomainError};

#[async_trait]
pub trait ChatMessenger: Send + Sync {
    /// Sends a Markdown message to `chat_id` as the bot owning `bot_token`.
    async fn send_message(
        &self,
        bot_token: &SecretString,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), DomainError>;
}
