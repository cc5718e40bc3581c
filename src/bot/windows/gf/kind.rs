//! Content-type picker for a greeting/farewell block.

use crate::bot::callbacks::{CallbackPayload, NavTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture, Trigger};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::keyboards;
use crate::cache::settings::GfKind;

fn text(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => "💁‍♂️ Choose the type of the greeting message:",
        GfKind::Farewell => "💁‍♂️ Choose the type of the farewell message:",
    }
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::AnyMediaKind, select_kind),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.send_screen(text(kind), keyboards::gf_kind(kind)).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.edit_screen(text(kind), keyboards::gf_kind(kind)).await?;
        Ok(())
    })
}

fn select_kind(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        let media = match &ctx.trigger {
            Trigger::Callback {
                payload: CallbackPayload::SelectMediaKind(_, media),
                ..
            } => *media,
            _ => return Ok(Transition::Stay),
        };

        let settings = ctx.settings().await?;
        if settings.gf(kind).kind == media {
            // Nothing changed; go back without redrawing the preview.
            return Ok(Transition::goto_silent(WindowId::gf(kind, GfStage::Menu)));
        }

        ctx.update_settings(move |row| super::set_kind(row, kind, media))
            .await?;
        ctx.queue_screen();
        ctx.queue_preview();
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Menu)))
    })
}

fn back(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        Ok(Transition::goto_silent(WindowId::gf(kind, GfStage::Menu)))
    })
}
