//! Chat message texts (HTML parse mode)
//!
//! Anything that came from the user or the provider goes through
//! [`escape`] before it is placed in a message.

use crate::constants::emoji;
use getstocks::{ItemSupport, JobHandle, ReadyFile};
use teloxide::types::ChatId;
use teloxide::utils::html::escape;

pub fn welcome(name: &str, max_links: usize) -> String {
    format!(
        "Hi <b>{}</b>!\n\nSend me a stock link to download it. \
         You can send up to <b>{}</b> links at once, one per line.",
        escape(name),
        max_links
    )
}

pub fn too_many_links(name: &str, max_links: usize) -> String {
    format!(
        "Hi <b>{}</b>, you can only send <b>{}</b> links at a time.",
        escape(name),
        max_links
    )
}

pub fn no_links(name: &str) -> String {
    format!(
        "Hi <b>{}</b>, I couldn't find a valid link in your message. \
         Please send http(s) links, one per line.",
        escape(name)
    )
}

pub fn type_prompt(name: &str, chat_id: ChatId, support: &ItemSupport) -> String {
    format!(
        "Hi <b>{}</b> (<code>{}</code>).\n\n\
         You are requesting a download from <b>{}</b> with id <b>{}</b>.\n\
         Please choose a type to continue:",
        escape(name),
        chat_id.0,
        escape(&support.slug),
        escape(&support.id)
    )
}

pub fn info_failed(reason: &str) -> String {
    format!("{} Sorry, unable to get info for this link: {}", emoji::ERROR, escape(reason))
}

pub fn submit_failed(reason: &str) -> String {
    format!("{} Error processing download: {}", emoji::ERROR, escape(reason))
}

pub fn batch_submit_failed(link: &str, reason: &str) -> String {
    format!(
        "{} Sorry, unable to process link: {} - {}",
        emoji::ERROR,
        escape(link),
        escape(reason)
    )
}

pub fn processing(handle: &JobHandle) -> String {
    format!(
        "{} Processing your download from <b>{}</b> with id <b>{}</b>. Please wait...",
        emoji::WAIT,
        escape(&handle.provider_slug),
        escape(&handle.item_id)
    )
}

pub fn ready(file: &ReadyFile) -> String {
    format!(
        "{} Your file is ready:\n\n\
         - Provider: <b>{}</b>\n\
         - ID: <b>{}</b>\n\
         - Filename: <b>{}</b>\n\
         - Size: <b>{}</b>",
        emoji::SUCCESS,
        escape(&file.provider_slug),
        escape(&file.item_id),
        escape(&file.filename),
        escape(&file.size)
    )
}

pub fn job_failed(handle: &JobHandle, reason: &str) -> String {
    format!(
        "{} Sorry, <b>{}</b> item <b>{}</b> can't be downloaded now! ({})",
        emoji::ERROR,
        escape(&handle.provider_slug),
        escape(&handle.item_id),
        escape(reason)
    )
}

pub fn timed_out(handle: &JobHandle) -> String {
    format!(
        "{} Sorry, <b>{}</b> item <b>{}</b> can't be downloaded now! (Timeout)",
        emoji::TIMEOUT,
        escape(&handle.provider_slug),
        escape(&handle.item_id)
    )
}

pub fn selection_missing() -> String {
    format!(
        "{} This choice has expired or was already used. Please send the link again.",
        emoji::ERROR
    )
}

pub fn cancelled(jobs: usize, prompts: usize) -> String {
    if jobs == 0 && prompts == 0 {
        "Nothing to cancel.".to_string()
    } else {
        format!(
            "Operation cancelled. Stopped {} download(s) and dismissed {} pending choice(s).",
            jobs, prompts
        )
    }
}

pub fn not_text() -> String {
    "Please send me a link as a text message. Type /help to see the usage.".to_string()
}
