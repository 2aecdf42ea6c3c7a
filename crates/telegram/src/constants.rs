//! Constants used throughout the telegram bot

use std::time::Duration;

/// Default number of links accepted in one message
pub const DEFAULT_MAX_INPUT_LINKS: usize = 5;

/// Telegram rejects callback data longer than this many bytes
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

/// How long a type prompt stays answerable
pub const DEFAULT_SELECTION_TTL: Duration = Duration::from_secs(600);

/// How often expired type prompts are swept
pub const SELECTION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Hex characters in a selection id
pub const SELECTION_ID_LEN: usize = 16;

/// Fallback when a chat has no first name
pub const DEFAULT_USER_NAME: &str = "User";

/// Emoji constants for consistent UI
pub mod emoji {
    pub const SUCCESS: &str = "✅";
    pub const ERROR: &str = "❌";
    pub const DOWNLOAD: &str = "📥";
    pub const WAIT: &str = "⏳";
    pub const TIMEOUT: &str = "⌛";
}
