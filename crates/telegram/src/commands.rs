use crate::constants::DEFAULT_USER_NAME;
use crate::flow::{self, ChatSink, ChatUser, Reply, SingleLinkOutcome};
use crate::messages;
use crate::types::{BotContext, Command, HandlerResult};
use crate::utils::{self, LinkPlan};
use teloxide::{prelude::*, utils::command::BotCommands};

fn chat_user(msg: &Message) -> ChatUser {
    ChatUser {
        chat_id: msg.chat.id,
        name: msg.chat.first_name().unwrap_or(DEFAULT_USER_NAME).to_string(),
    }
}

/// Greet the user
pub async fn start(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let user = chat_user(&msg);
    bot.send(user.chat_id, Reply::text(messages::welcome(&user.name, ctx.settings.max_links)))
        .await?;
    Ok(())
}

/// Display help message with available commands
pub async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// Stop the chat's running downloads and forget its pending type prompts
pub async fn cancel(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let jobs = ctx.jobs.cancel_chat(msg.chat.id.0);
    let prompts = ctx.selections.clear_chat(msg.chat.id.0);
    tracing::info!("Chat {} cancelled {} jobs and {} prompts", msg.chat.id.0, jobs, prompts);

    bot.send_message(msg.chat.id, messages::cancelled(jobs, prompts))
        .await?;
    Ok(())
}

/// Process a plain message containing one or more links
pub async fn links(bot: Bot, msg: Message, ctx: BotContext) -> HandlerResult {
    let text = match msg.text() {
        Some(t) => t,
        None => {
            bot.send(msg.chat.id, Reply::text(messages::not_text())).await?;
            return Ok(());
        }
    };

    let user = chat_user(&msg);

    match utils::plan_links(text, ctx.settings.max_links) {
        LinkPlan::NoLinks => {
            bot.send(user.chat_id, Reply::text(messages::no_links(&user.name)))
                .await?;
        }
        LinkPlan::TooMany { count, max } => {
            tracing::info!("Chat {} sent {} links, limit is {}", user.chat_id.0, count, max);
            bot.send(user.chat_id, Reply::text(messages::too_many_links(&user.name, max)))
                .await?;
        }
        LinkPlan::Single(link) => {
            let outcome = flow::resolve_single(&ctx.api, &bot, &ctx.selections, &user, &link).await?;
            if let SingleLinkOutcome::Submit(request) = outcome {
                ctx.spawn_job(bot.clone(), user.chat_id, request, false);
            }
        }
        LinkPlan::Batch(links) => {
            tracing::info!("Chat {} submitted {} links", user.chat_id.0, links.len());
            for link in links {
                ctx.spawn_job(bot.clone(), user.chat_id, getstocks::JobRequest::with_defaults(link), true);
            }
        }
    }

    Ok(())
}
