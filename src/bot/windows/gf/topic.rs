//! Topic picker for a greeting/farewell block in forum chats.
//!
//! The owner sends any text message inside the target Topic; its thread
//! id becomes the block's destination. A confirmation is posted into that
//! Topic to prove the bot can actually write there.

use anyhow::Context as _;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::Requester;

use crate::bot::callbacks::{GfAction, NavTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, InputPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::keyboards;
use crate::bot::util::{guarded, is_topic_closed, mention};
use crate::cache::settings::GfKind;

fn topic_label(topic: Option<i64>) -> String {
    match topic {
        Some(id) => id.to_string(),
        None => "General".to_string(),
    }
}

fn prompt(kind: GfKind, stored: Option<i64>) -> String {
    let noun = match kind {
        GfKind::Greeting => "greeting",
        GfKind::Farewell => "farewell",
    };
    format!(
        "💁‍♂️ Now send any text message in the Topic where the {} should be \
        sent.\n\
        \n\
        💾 Current Topic ID: <blockquote>{}</blockquote>",
        noun,
        topic_label(stored)
    )
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Gf(GfAction::ResetTopic), reset_topic),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![(InputPredicate::Text, on_text)],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let settings = ctx.settings().await?;
        let text = prompt(kind, settings.gf(kind).topic_id);
        ctx.send_screen(&text, keyboards::gf_leaf(kind, GfAction::ResetTopic))
            .await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let settings = ctx.settings().await?;
        let text = prompt(kind, settings.gf(kind).topic_id);
        ctx.edit_screen(&text, keyboards::gf_leaf(kind, GfAction::ResetTopic))
            .await?;
        Ok(())
    })
}

fn on_text(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let input = ctx.input().context("text input without a message")?;
        let input_id = input.id;
        let thread = input.thread_id;
        let topic = thread.map(|t| i64::from(t.0 .0));

        ctx.update_settings(move |row| super::set_topic(row, kind, topic))
            .await?;
        ctx.queue_screen();
        ctx.queue_preview();
        ctx.queue_user_message(input_id);

        let confirmation = format!(
            "✅ Topic ID saved: <blockquote>TOPIC_ID: {}</blockquote>",
            topic_label(topic)
        );
        let mut request = ctx
            .bot
            .send_message(ctx.chat_id, confirmation)
            .parse_mode(teloxide::types::ParseMode::Html);
        if let Some(thread) = thread {
            request = request.message_thread_id(thread);
        }
        match guarded("confirm topic selection", false, request).await {
            Ok(sent) => {
                if let Some(sent) = sent {
                    ctx.data.bot_messages_to_delete.insert(sent.id.0);
                }
            }
            Err(e) if is_topic_closed(&e) => {
                let warning = format!(
                    "⚠️ {}, the selected Topic is closed; the bot cannot post \
                    there. Choose another Topic.",
                    mention(&ctx.user)
                );
                let mut request = ctx
                    .bot
                    .send_message(ctx.chat_id, warning)
                    .parse_mode(teloxide::types::ParseMode::Html);
                if let Some(thread) = ctx.thread_id() {
                    request = request.message_thread_id(thread);
                }
                let sent = request
                    .await
                    .context("failed to warn about a closed topic")?;
                ctx.data.bot_messages_to_delete.insert(sent.id.0);
                return Ok(Transition::Stay);
            }
            Err(e) => return Err(e).context("failed to confirm topic selection"),
        }

        Ok(Transition::goto(WindowId::gf(kind, GfStage::Menu)))
    })
}

fn reset_topic(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.update_settings(move |row| super::set_topic(row, kind, None))
            .await?;
        ctx.alert("✅ Topic ID has been reset.").await;
        Ok(Transition::goto_silent(WindowId::gf(kind, GfStage::Menu)))
    })
}

fn back(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto_silent(WindowId::gf(kind, GfStage::Menu)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_shows_general_for_unset_topic() {
        let text = prompt(GfKind::Greeting, None);
        assert!(text.contains("General"));

        let text = prompt(GfKind::Farewell, Some(42));
        assert!(text.contains("42"));
        assert!(text.contains("farewell"));
    }
}
