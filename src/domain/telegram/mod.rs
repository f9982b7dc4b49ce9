//! Telegram domain module.
//!
//! # Module Structure
//!
//! - `update` - Bot API update types and classification
//! - `command` - Command table
//! - `replies` - Reply and notice text

mod command;
pub mod replies;
mod update;

pub use command::Command;
pub use update::{
    Chat, ChatMember, ChatMemberUpdated, ChatType, MemberStatus, Message, TelegramUpdate, Update,
    User,
};
