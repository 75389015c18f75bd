//! Error types for the bot core.
//!
//! Two kinds are recoverable and rendered as a single `[ERROR] …` chat
//! line: [`BotError::UserInput`] (the sender got the invocation wrong) and
//! [`BotError::Backend`] (an execution backend failed or returned garbage).
//! Everything else takes the unknown-error path in the dispatcher: apology
//! reply, operator alert, and the original error handed back to the host.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum BotError {
    #[error("{0}")]
    UserInput(String),
    #[error("{0}")]
    Backend(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("store operation failed: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// True for the kinds that render as a chat-visible `[ERROR]` line
    /// instead of escalating to the unknown-error path.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::UserInput(_) | BotError::Backend(_))
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::Backend(err.to_string())
    }
}
