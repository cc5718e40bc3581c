//! Hub window of a greeting/farewell subtree.
//!
//! A fresh entry sweeps the previous screens, posts a live preview of the
//! configured message and anchors the menu under it as a reply. A silent
//! entry keeps both messages and only refreshes the menu in place.

use teloxide::payloads::EditMessageTextSetters;
use teloxide::prelude::Requester;
use teloxide::types::ParseMode;

use crate::bot::callbacks::{GfAction, NavTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::util::{best_effort, mention};
use crate::bot::{keyboards, preview};
use crate::cache::settings::GfKind;

const GREETING_TEXT: &str = "💁‍♂️ In this window, you can customize the greeting \
    for new chat members.\n\
    \n\
    <blockquote expandable>💡 The message above is a live preview of the current \
    greeting.\n\
    \n\
    💡 Use <code>{mention}</code> in the text to mention the new member.\n\
    \n\
    💡 The Topic ID setting selects the Topic the greeting is sent to in forum \
    chats.</blockquote>";

const FAREWELL_TEXT: &str = "💁‍♂️ In this window, you can customize the farewell \
    for members who left the chat.\n\
    \n\
    <blockquote expandable>💡 The message above is a live preview of the current \
    farewell.\n\
    \n\
    💡 Use <code>{mention}</code> in the text to mention the member who left.\n\
    \n\
    💡 The Topic ID setting selects the Topic the farewell is sent to in forum \
    chats.</blockquote>";

fn menu_text(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => GREETING_TEXT,
        GfKind::Farewell => FAREWELL_TEXT,
    }
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message: enter,
        enter_callback: enter,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Gf(GfAction::OpenKind), open_kind),
            (ActionPredicate::Gf(GfAction::OpenText), open_text),
            (ActionPredicate::Gf(GfAction::OpenMedia), open_media),
            (ActionPredicate::Gf(GfAction::OpenTopic), open_topic),
            (ActionPredicate::Gf(GfAction::ResetText), reset_text),
            (ActionPredicate::Gf(GfAction::ResetMedia), reset_media),
            (ActionPredicate::Gf(GfAction::ResetTopic), reset_topic),
            (ActionPredicate::Gf(GfAction::ResetAll), reset_all),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![],
    }
}

fn enter(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.sweep(&[], ctx.fresh).await?;
        let settings = ctx.settings().await?;
        let text = menu_text(kind);
        let markup = keyboards::gf_menu(kind, settings.gf(kind));

        if !ctx.fresh {
            // Keyboard labels may be stale after a no-op action; refresh
            // in place and ignore "message is not modified".
            if let Some(screen) = ctx.screen_id() {
                best_effort(
                    "refresh greeting/farewell menu",
                    ctx.bot
                        .edit_message_text(ctx.chat_id, screen, text)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(markup),
                )
                .await;
                ctx.data.current_message_id = Some(screen.0);
            }
            return Ok(());
        }

        let payload = preview::build(
            kind,
            settings.gf(kind),
            &ctx.deps.media,
            &mention(&ctx.user),
        );
        let sent = preview::send(&ctx.bot, ctx.chat_id, ctx.thread_id(), payload).await?;
        ctx.data.preview_message_id = Some(sent.id.0);
        ctx.send_screen_replying(text, markup, sent.id).await?;
        Ok(())
    })
}

fn open_kind(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Kind)))
    })
}

fn open_text(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Text)))
    })
}

fn open_media(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Media)))
    })
}

fn open_topic(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        if !ctx.screen_is_topic() {
            ctx.alert("⚠️ This chat doesn't contain Topics.").await;
            return Ok(Transition::Stay);
        }
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Topic)))
    })
}

fn reset_text(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let settings = ctx.settings().await?;
        let updated = settings.gf(kind).text.is_some();
        if updated {
            ctx.update_settings(move |row| super::set_text(row, kind, None))
                .await?;
            ctx.queue_screen();
            ctx.queue_preview();
        } else {
            ctx.alert("✅").await;
        }
        Ok(Transition::retake(updated))
    })
}

fn reset_media(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let settings = ctx.settings().await?;
        let gf = settings.gf(kind);
        let updated = gf.selected_media().is_some();
        if updated {
            let media = gf.kind;
            ctx.update_settings(move |row| super::clear_media(row, kind, media))
                .await?;
            ctx.queue_screen();
            ctx.queue_preview();
        } else {
            ctx.alert("✅").await;
        }
        Ok(Transition::retake(updated))
    })
}

/// The menu carries no topic state of its own, so this reset never needs a
/// re-render.
fn reset_topic(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.update_settings(move |row| super::set_topic(row, kind, None))
            .await?;
        ctx.alert("✅ Topic ID has been reset.").await;
        Ok(Transition::Stay)
    })
}

fn reset_all(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let settings = ctx.settings().await?;
        let updated = !settings.gf(kind).is_default();
        if updated {
            ctx.update_settings(move |row| super::clear_all(row, kind))
                .await?;
            ctx.queue_screen();
            ctx.queue_preview();
        } else {
            ctx.alert("✅").await;
        }
        Ok(Transition::retake(updated))
    })
}

/// The preview has no place outside this subtree; queue it so the parent
/// window's sweep removes it.
fn back(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        ctx.queue_preview();
        Ok(Transition::goto_silent(WindowId::GeneralSettings))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_text_is_block_specific() {
        assert!(menu_text(GfKind::Greeting).contains("greeting"));
        assert!(menu_text(GfKind::Farewell).contains("farewell"));
        assert_ne!(menu_text(GfKind::Greeting), menu_text(GfKind::Farewell));
    }

    // Reset-all shares the sibling resets' guard: a block that is already
    // at its defaults must not be rewritten or re-rendered.
    #[test]
    fn test_reset_all_guard_skips_clean_block() {
        let settings = crate::cache::settings::tests::sample_settings();
        assert!(settings.gf(GfKind::Greeting).is_default());

        let mut dirty = settings;
        dirty.greeting.text = Some("hello {mention}".into());
        dirty.farewell.topic_id = Some(42);
        assert!(!dirty.gf(GfKind::Greeting).is_default());
        assert!(!dirty.gf(GfKind::Farewell).is_default());
    }
}
