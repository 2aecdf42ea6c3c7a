//! Web form for GetStocks downloads
//!
//! This crate serves a single page where a user pastes a stock link, picks a
//! type, and waits for the download link. The page talks to one `POST /`
//! endpoint which relays each action to the GetStocks API.

mod actions;
mod error;
mod server;

pub use actions::{Action, ActionForm};
pub use error::AppError;
pub use server::WebFormApi;

/// Result type alias for web form operations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
