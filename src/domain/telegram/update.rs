//! Telegram Bot API update types.
//!
//! Only the fields the dispatcher reads are captured; everything else in
//! the update is ignored. Raw updates are classified once into
//! [`TelegramUpdate`].

use serde::Deserialize;

use super::command::Command;
use crate::domain::foundation::{ChatId, TelegramUserId};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub my_chat_member: Option<ChatMemberUpdated>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn telegram_user_id(&self) -> Option<TelegramUserId> {
        TelegramUserId::new(self.id).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatType,
    #[serde(default)]
    pub title: Option<String>,
}

impl Chat {
    pub fn chat_id(&self) -> ChatId {
        ChatId::new(self.id)
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ChatType::Group | ChatType::Supergroup)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
    #[serde(other)]
    Unknown,
}

impl MemberStatus {
    /// Statuses in which the bot can read and post in the chat.
    pub fn is_present(&self) -> bool {
        matches!(self, MemberStatus::Member | MemberStatus::Administrator)
    }

    pub fn is_gone(&self) -> bool {
        matches!(self, MemberStatus::Left | MemberStatus::Kicked)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMember {
    pub status: MemberStatus,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    pub old_chat_member: ChatMember,
    pub new_chat_member: ChatMember,
}

/// An update after classification.
#[derive(Debug, Clone)]
pub enum TelegramUpdate {
    /// Someone's membership changed in a chat the bot is in.
    MembershipChange(ChatMemberUpdated),
    /// A `/command` message.
    Command {
        chat: Chat,
        from: User,
        command: Command,
    },
    /// Non-command text. The bot does not take part in conversation.
    PlainText { chat: Chat },
    /// Anything else (edits, channel posts, messages without sender...).
    Ignored,
}

impl Update {
    pub fn classify(self) -> TelegramUpdate {
        if let Some(change) = self.my_chat_member {
            return TelegramUpdate::MembershipChange(change);
        }

        let Some(message) = self.message else {
            return TelegramUpdate::Ignored;
        };
        let (Some(from), Some(text)) = (message.from, message.text) else {
            return TelegramUpdate::Ignored;
        };

        match Command::parse(&text) {
            Some(command) => TelegramUpdate::Command {
                chat: message.chat,
                from,
                command,
            },
            None => TelegramUpdate::PlainText { chat: message.chat },
        }
    }
}
