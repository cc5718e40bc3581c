//! Batched deletion of messages accumulated during a window session.

use anyhow::Result;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::MessageId;
use tracing::warn;

use super::FsmData;
use crate::bot::util::best_effort;
use crate::cache::chat_member::BotMemberCache;

/// Pause after a batch deletion so the next render does not race the
/// platform applying it.
const SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Delete every message queued in the conversation state.
///
/// Bot-authored messages are always attempted; user-authored ones only
/// when the bot holds the delete-messages right in this chat (checked
/// through the capability cache). All deletions are best-effort. Both
/// queues are reset afterwards, and if anything was queued at all the
/// settle delay is imposed before returning.
pub async fn sweep(
    bot: &Bot,
    members: &BotMemberCache,
    chat_id: ChatId,
    data: &mut FsmData,
    extra_user_messages: &[i32],
    extend: bool,
) -> Result<()> {
    if extend {
        data.user_messages_to_delete
            .extend(extra_user_messages.iter().copied());
    }

    let bot_messages: Vec<MessageId> = data
        .bot_messages_to_delete
        .iter()
        .map(|id| MessageId(*id))
        .collect();
    let user_messages: Vec<MessageId> = data
        .user_messages_to_delete
        .iter()
        .map(|id| MessageId(*id))
        .collect();

    if !bot_messages.is_empty() {
        best_effort(
            "delete queued bot messages",
            bot.delete_messages(chat_id, bot_messages.clone()),
        )
        .await;
    }

    if !user_messages.is_empty() {
        match members.get_or_fetch(bot, chat_id).await {
            Ok(member) if member.can_delete_messages => {
                best_effort(
                    "delete queued user messages",
                    bot.delete_messages(chat_id, user_messages.clone()),
                )
                .await;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(
                    "Skipping user message cleanup in chat {}: {:#}",
                    chat_id, e
                );
            }
        }
    }

    data.bot_messages_to_delete.clear();
    data.user_messages_to_delete.clear();

    if !bot_messages.is_empty() || !user_messages.is_empty() {
        tokio::time::sleep(SETTLE_DELAY).await;
    }

    Ok(())
}
