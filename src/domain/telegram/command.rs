//! Bot commands.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Status,
    Help,
    /// Any other `/command`, normalized.
    Unknown(String),
}

static COMMANDS: Lazy<HashMap<&'static str, Command>> = Lazy::new(|| {
    HashMap::from([
        ("/start", Command::Start),
        ("/status", Command::Status),
        ("/help", Command::Help),
    ])
});

impl Command {
    /// Parses the first whitespace-delimited token of `text`.
    ///
    /// Matching is case-insensitive and ignores a trailing `@botname`.
    /// Returns `None` when the text is not a command at all.
    pub fn parse(text: &str) -> Option<Command> {
        let token = text.split_whitespace().next()?;
        if !token.starts_with('/') {
            return None;
        }

        let name = token
            .split_once('@')
            .map_or(token, |(name, _bot)| name)
            .to_lowercase();

        Some(
            COMMANDS
                .get(name.as_str())
                .cloned()
                .unwrap_or(Command::Unknown(name)),
        )
    }
}
