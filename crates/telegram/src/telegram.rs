use crate::constants::SELECTION_CLEANUP_INTERVAL;
use crate::selection::SelectionStore;
use crate::types::{BotContext, Command};
use crate::{callbacks, commands};
use std::net::SocketAddr;
use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    update_listeners::webhooks,
    utils::command::BotCommands,
};
use tokio::task::JoinHandle;
use url::Url;

/// Where Telegram should deliver updates when running behind a webhook
#[derive(Debug, Clone)]
pub struct WebhookSettings {
    /// Public URL registered with Telegram
    pub url: Url,
    /// Local address the webhook listener binds to
    pub address: SocketAddr,
}

/// Register bot commands in Telegram menu
pub async fn set_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(commands::start))
        .branch(case![Command::Help].endpoint(commands::help))
        .branch(case![Command::Cancel].endpoint(commands::cancel));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(dptree::endpoint(commands::links));

    // Handle callback queries from inline keyboards
    let callback_handler = Update::filter_callback_query()
        .endpoint(callbacks::handle_callback);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

/// Periodically drop type prompts nobody answered
pub fn spawn_selection_cleanup(store: SelectionStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SELECTION_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let cleaned = store.cleanup_expired();
            if cleaned > 0 {
                tracing::info!("Cleaned up {} expired selections", cleaned);
            }
        }
    })
}

/// Run the bot until Ctrl-C, using long polling or a webhook
///
/// # Errors
/// Returns an error if the webhook cannot be registered with Telegram
pub async fn run(bot: Bot, ctx: BotContext, webhook: Option<WebhookSettings>) -> Result<(), teloxide::RequestError> {
    if let Err(e) = set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    let cleanup = spawn_selection_cleanup(ctx.selections.clone());

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![ctx.clone()])
        .enable_ctrlc_handler()
        .build();

    match webhook {
        Some(settings) => {
            tracing::info!("Receiving updates through webhook {} on {}", settings.url, settings.address);
            let listener = webhooks::axum(bot, webhooks::Options::new(settings.address, settings.url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
        None => {
            tracing::info!("Receiving updates through long polling");
            dispatcher.dispatch().await;
        }
    }

    ctx.jobs.shutdown();
    cleanup.abort();
    Ok(())
}
