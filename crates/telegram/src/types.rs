use getstocks::{GetStocksApi, JobRequest, PollSettings};
use teloxide::{macros::BotCommands, prelude::*, utils::html::escape};
use tokio::task::JoinHandle;

use crate::constants::{DEFAULT_MAX_INPUT_LINKS, DEFAULT_SELECTION_TTL};
use crate::error::UserMessage;
use crate::flow::{self, ChatSink, Reply};
use crate::jobs::JobTracker;
use crate::selection::SelectionStore;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Available bot commands
#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "Send me a stock link (or several, one per line) to download it. \
                   These commands are supported:"
)]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Display help information")]
    Help,
    #[command(description = "Stop running downloads and dismiss pending choices")]
    Cancel,
}

/// Chat-side limits and timings
#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub max_links: usize,
    pub poll: PollSettings,
    pub selection_ttl: std::time::Duration,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_INPUT_LINKS,
            poll: PollSettings::chat(),
            selection_ttl: DEFAULT_SELECTION_TTL,
        }
    }
}

/// Everything a handler needs, injected through the dispatcher
#[derive(Clone)]
pub struct BotContext {
    pub api: GetStocksApi,
    pub selections: SelectionStore,
    pub jobs: JobTracker,
    pub settings: ChatSettings,
}

impl BotContext {
    pub fn new(api: GetStocksApi, settings: ChatSettings) -> Self {
        Self {
            api,
            selections: SelectionStore::new(settings.selection_ttl),
            jobs: JobTracker::new(),
            settings,
        }
    }

    /// Submit and poll `request` on its own task, reporting to `chat_id`
    pub fn spawn_job(&self, bot: Bot, chat_id: ChatId, request: JobRequest, batch: bool) -> JoinHandle<()> {
        let api = self.api.clone();
        let settings = self.settings.poll;
        let guard = self.jobs.start(chat_id.0);
        tracing::debug!("Chat {} has {} running jobs", chat_id.0, self.jobs.active(chat_id.0));

        tokio::spawn(async move {
            let result = flow::run_job(&api, &bot, chat_id, &request, settings, guard.token(), batch).await;
            if let Err(err) = result {
                tracing::error!("Job for {} in chat {} failed: {}", request.link, chat_id.0, err);
                if let Err(notify) = bot.send(chat_id, Reply::text(escape(&err.user_message()))).await {
                    tracing::error!("Could not report failure to chat {}: {}", chat_id.0, notify);
                }
            }
            drop(guard);
        })
    }
}
