//! Telegram front end for the GetStocks relay
//!
//! Users send one or more stock links; the bot resolves them, asks for a type
//! where the provider offers a choice, and reports back with a download
//! button once the provider has the file ready.

pub mod callbacks;
pub mod commands;
pub mod constants;
pub mod error;
pub mod flow;
pub mod jobs;
pub mod keyboards;
pub mod messages;
pub mod selection;
pub mod telegram;
pub mod types;
pub mod utils;

pub use error::{BotError, BotResult};
pub use telegram::WebhookSettings;
pub use types::{BotContext, ChatSettings, Command, HandlerResult};
