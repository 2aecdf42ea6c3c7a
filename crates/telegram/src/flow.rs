//! The chat-side "resolve, submit, poll, report" flows
//!
//! These are written against [`Provider`] and [`ChatSink`] rather than the
//! concrete API client and `Bot`, so the whole conversation can be replayed in
//! tests without Telegram or the network.

use std::future::Future;

use getstocks::{poll_until_ready, JobRequest, PollOutcome, PollSettings, Provider};
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};
use tokio_util::sync::CancellationToken;

use crate::error::BotResult;
use crate::keyboards;
use crate::messages;
use crate::selection::{PendingSelection, SelectionStore};

/// One outgoing chat message
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Somewhere replies can be sent
pub trait ChatSink: Send + Sync {
    fn send(&self, chat_id: ChatId, reply: Reply) -> impl Future<Output = BotResult<()>> + Send;
}

impl ChatSink for Bot {
    async fn send(&self, chat_id: ChatId, reply: Reply) -> BotResult<()> {
        let request = self.send_message(chat_id, reply.text).parse_mode(ParseMode::Html);
        match reply.keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(())
    }
}

/// Who we are talking to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub chat_id: ChatId,
    pub name: String,
}

/// What came of resolving a single link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleLinkOutcome {
    /// The user was shown a type prompt for this selection id
    Prompted(String),
    /// The provider offered no types; submit straight away
    Submit(JobRequest),
    /// Resolution failed and the user was told why
    Failed,
}

/// Resolve a single link and either prompt for a type or hand back a request
/// ready to submit.
pub async fn resolve_single<P, S>(
    provider: &P,
    sink: &S,
    selections: &SelectionStore,
    user: &ChatUser,
    link: &str,
) -> BotResult<SingleLinkOutcome>
where
    P: Provider,
    S: ChatSink,
{
    let support = match provider.get_info(link, true).await {
        Ok(support) => support,
        Err(err) => {
            sink.send(user.chat_id, Reply::text(messages::info_failed(&err.to_string())))
                .await?;
            return Ok(SingleLinkOutcome::Failed);
        }
    };

    if support.types.is_empty() {
        tracing::info!("{} offers no type choice for {}, submitting directly", support.slug, link);
        return Ok(SingleLinkOutcome::Submit(JobRequest::new(link, support.premium, None)));
    }

    let text = messages::type_prompt(&user.name, user.chat_id, &support);
    let offered = support.types.clone();
    let selection_id = selections.insert(PendingSelection::new(
        user.chat_id.0,
        link,
        support.premium,
        support.types,
    ));
    let keyboard = keyboards::type_selection_keyboard(&selection_id, &offered);

    sink.send(user.chat_id, Reply::with_keyboard(text, keyboard)).await?;
    Ok(SingleLinkOutcome::Prompted(selection_id))
}

/// Turn a button press into a job request, consuming the pending selection.
///
/// A missing, expired or foreign selection, or an option index out of range,
/// gets a polite reply and `None`.
pub async fn claim_selection<S>(
    sink: &S,
    selections: &SelectionStore,
    chat_id: ChatId,
    selection_id: &str,
    option: usize,
) -> BotResult<Option<JobRequest>>
where
    S: ChatSink,
{
    let chosen = selections.take(selection_id, chat_id.0).and_then(|selection| {
        let key = selection.types.get(option)?.key.clone();
        Some(JobRequest::new(selection.link, selection.premium, Some(key)))
    });

    if chosen.is_none() {
        sink.send(chat_id, Reply::text(messages::selection_missing())).await?;
    }
    Ok(chosen)
}

/// Submit `request`, poll it and report the result.
///
/// `batch` only changes the wording of a failed submission. Returns the poll
/// outcome, or `None` when the submission itself failed.
pub async fn run_job<P, S>(
    provider: &P,
    sink: &S,
    chat_id: ChatId,
    request: &JobRequest,
    settings: PollSettings,
    cancel: &CancellationToken,
    batch: bool,
) -> BotResult<Option<PollOutcome>>
where
    P: Provider,
    S: ChatSink,
{
    let handle = match provider.get_link(request).await {
        Ok(handle) => handle,
        Err(err) => {
            let text = if batch {
                messages::batch_submit_failed(&request.link, &err.to_string())
            } else {
                messages::submit_failed(&err.to_string())
            };
            sink.send(chat_id, Reply::text(text)).await?;
            return Ok(None);
        }
    };

    sink.send(chat_id, Reply::text(messages::processing(&handle))).await?;

    let outcome = poll_until_ready(provider, &handle, settings, cancel).await;

    match &outcome {
        PollOutcome::Ready(file) => {
            let text = messages::ready(file);
            let reply = match keyboards::download_keyboard(&file.download_link) {
                Some(keyboard) => Reply::with_keyboard(text, keyboard),
                None => Reply::text(text),
            };
            sink.send(chat_id, reply).await?;
        }
        PollOutcome::Failed(reason) => {
            sink.send(chat_id, Reply::text(messages::job_failed(&handle, reason)))
                .await?;
        }
        PollOutcome::TimedOut => {
            sink.send(chat_id, Reply::text(messages::timed_out(&handle))).await?;
        }
        PollOutcome::Cancelled => {
            tracing::info!("Job {}/{} cancelled", handle.provider_slug, handle.item_id);
        }
    }

    Ok(Some(outcome))
}
