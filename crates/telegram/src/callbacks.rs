//! Callback query handlers for inline keyboard interactions

use crate::constants::MAX_CALLBACK_DATA_LEN;
use crate::flow;
use crate::types::{BotContext, HandlerResult};
use teloxide::prelude::*;

/// A parsed button press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// The user picked option `index` of pending selection `selection_id`
    SelectType { selection_id: String, index: usize },
}

/// Callback data for the `index`-th type button of a selection
pub fn type_callback_data(selection_id: &str, index: usize) -> String {
    format!("type:{}:{}", selection_id, index)
}

/// Parse callback data produced by this bot
pub fn parse_callback_data(data: &str) -> Option<CallbackAction> {
    let parts: Vec<&str> = data.split(':').collect();

    match parts.as_slice() {
        ["type", selection_id, index] if !selection_id.is_empty() => {
            let index = index.parse::<usize>().ok()?;
            Some(CallbackAction::SelectType {
                selection_id: selection_id.to_string(),
                index,
            })
        }
        _ => None,
    }
}

/// Handle all callback queries from inline keyboards
pub async fn handle_callback(bot: Bot, q: CallbackQuery, ctx: BotContext) -> HandlerResult {
    // Answer callback query to remove loading state
    bot.answer_callback_query(&q.id).await?;

    let data = match q.data {
        Some(ref data) => data,
        None => return Ok(()),
    };

    // Validate callback data length to prevent abuse
    if data.len() > MAX_CALLBACK_DATA_LEN {
        tracing::warn!("Callback data too long: {} bytes", data.len());
        return Ok(());
    }

    let message = match q.message {
        Some(ref msg) => msg,
        None => return Ok(()),
    };

    match parse_callback_data(data) {
        Some(CallbackAction::SelectType { selection_id, index }) => {
            // Drop the buttons so the prompt cannot be answered twice
            if let Err(e) = bot.edit_message_reply_markup(message.chat.id, message.id).await {
                tracing::debug!("Could not clear type buttons: {}", e);
            }

            let request =
                flow::claim_selection(&bot, &ctx.selections, message.chat.id, &selection_id, index).await?;

            if let Some(request) = request {
                tracing::info!(
                    "Chat {} chose type {:?} for {}",
                    message.chat.id.0,
                    request.item_type,
                    request.link
                );
                ctx.spawn_job(bot.clone(), message.chat.id, request, false);
            }
        }
        None => {
            tracing::debug!("Ignoring unknown callback data: {}", data);
        }
    }

    Ok(())
}
