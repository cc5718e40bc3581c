//! Free-text editor for a greeting/farewell block.

use anyhow::Context as _;

use crate::bot::callbacks::{GfAction, NavTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, InputPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::keyboards;
use crate::cache::settings::GfKind;

const TOO_LONG_TEXT: &str = "⚠️ Text is too long.\n\
    \n\
    💁‍♂️ Maximum text length: <code>1000</code> symbols.\n\
    \n\
    💡 Enter another text or use /cancel to cancel.";

fn prompt(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => {
            "💁‍♂️ Send the new greeting text.\n\
            \n\
            💡 HTML markup and the <code>{mention}</code> token are supported."
        }
        GfKind::Farewell => {
            "💁‍♂️ Send the new farewell text.\n\
            \n\
            💡 HTML markup and the <code>{mention}</code> token are supported."
        }
    }
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Gf(GfAction::ResetText), reset_text),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![(InputPredicate::Text, on_text)],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.send_screen(
            prompt(kind),
            keyboards::gf_leaf(kind, GfAction::ResetText),
        )
        .await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.edit_screen(
            prompt(kind),
            keyboards::gf_leaf(kind, GfAction::ResetText),
        )
        .await?;
        Ok(())
    })
}

fn on_text(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let input = ctx.input().context("text input without a message")?;
        let text = input
            .text()
            .context("text input without text")?
            .to_string();
        let input_id = input.id;

        if text.chars().count() > super::MAX_GF_TEXT_LEN {
            ctx.queue_screen();
            ctx.send_screen(
                TOO_LONG_TEXT,
                keyboards::gf_leaf(kind, GfAction::ResetText),
            )
            .await?;
            ctx.queue_user_message(input_id);
            return Ok(Transition::Stay);
        }

        ctx.update_settings(move |row| super::set_text(row, kind, Some(text)))
            .await?;
        ctx.queue_screen();
        ctx.queue_preview();
        ctx.queue_user_message(input_id);
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Menu)))
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
        }
        Ok(Transition::Goto {
            window: WindowId::gf(kind, GfStage::Menu),
            fresh: updated,
        })
    })
}

fn back(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto_silent(WindowId::gf(kind, GfStage::Menu)))
    })
}
