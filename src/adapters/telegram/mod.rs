//! Telegram adapters.

mod bot_api;

pub use bot_api::{TelegramBotApi, DEFAULT_API_BASE_URL};
