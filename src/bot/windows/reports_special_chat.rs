//! Assignment window for the dedicated reports chat.
//!
//! Entering it creates a pending record keyed to this screen; the
//! choose-chat button prefills an inline query with the public token, and
//! the confirmation command sent from the target chat closes the loop.

use anyhow::Context as _;
use teloxide::payloads::EditMessageReplyMarkupSetters;
use teloxide::prelude::Requester;

use crate::bot::callbacks::NavTarget;
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;
use crate::cache::settings::ChatSettings;

fn text(settings: &ChatSettings) -> String {
    let is_set = settings.reports_special_chat_id.is_some();
    let chat_line = match settings.reports_special_chat_id {
        Some(id) => format!("<blockquote>CHAT_ID: {}</blockquote>", id),
        None => "❌".to_string(),
    };
    format!(
        "🔧 Chat for reports\n\
        \n\
        💾 Configured: {}\n\
        💾 Current chat: {}\n\
        \n\
        💁‍♂️ Press the button below and choose the chat that should receive \
        reports. The bot will hand you a confirmation command to send in that \
        chat.",
        if is_set { "✅" } else { "❌" },
        chat_line
    )
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: Some(on_leave),
        actions: vec![(ActionPredicate::Nav(NavTarget::Back), back)],
        inputs: vec![],
    }
}

/// A re-entry replaces any previous pending record; the token shown on
/// screen is always the newest one.
fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        let settings = ctx.settings().await?;
        let screen = ctx
            .screen_id()
            .context("no current screen for the assignment window")?;
        let public = ctx
            .deps
            .pending
            .create(ctx.chat_id.0, screen.0, ctx.user.id.0)
            .await?;
        ctx.edit_screen(&text(&settings), keyboards::reports_special_chat(&public))
            .await?;
        Ok(())
    })
}

/// Message-path entry has no screen to key the pending record to yet, so
/// the screen is sent first and the keyboard attached once its id exists.
fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        let settings = ctx.settings().await?;
        let sent = ctx.send_screen(&text(&settings), keyboards::back_only()).await?;
        let public = ctx
            .deps
            .pending
            .create(ctx.chat_id.0, sent.0, ctx.user.id.0)
            .await?;
        ctx.bot
            .edit_message_reply_markup(ctx.chat_id, sent)
            .reply_markup(keyboards::reports_special_chat(&public))
            .await
            .context("failed to attach the choose-chat keyboard")?;
        Ok(())
    })
}

fn on_leave(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        Ok(())
    })
}

fn back(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::ReportsPolicy)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_shows_current_assignment() {
        let mut settings = crate::cache::settings::tests::sample_settings();
        assert!(text(&settings).contains("❌"));

        settings.reports_special_chat_id = Some(-1007);
        let rendered = text(&settings);
        assert!(rendered.contains("CHAT_ID: -1007"));
        assert!(rendered.contains("✅"));
    }
}
