use std::fmt;

/// Custom error type for telegram bot operations
///
/// Provider failures never show up here: the flows report them to the chat
/// themselves, so only a failed Telegram call can abort a handler.
#[derive(Debug)]
pub enum BotError {
    /// Telegram API error
    TelegramError(teloxide::RequestError),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotError::TelegramError(e) => write!(f, "Telegram error: {}", e),
        }
    }
}

impl std::error::Error for BotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BotError::TelegramError(e) => Some(e),
        }
    }
}

impl From<teloxide::RequestError> for BotError {
    fn from(err: teloxide::RequestError) -> Self {
        BotError::TelegramError(err)
    }
}

/// Result type alias for bot operations
pub type BotResult<T> = Result<T, BotError>;

/// Helper trait to convert results into user-friendly messages
pub trait UserMessage {
    fn user_message(&self) -> String;
}

impl UserMessage for BotError {
    fn user_message(&self) -> String {
        match self {
            BotError::TelegramError(e) => format!("❌ Communication error: {}", e),
        }
    }
}
