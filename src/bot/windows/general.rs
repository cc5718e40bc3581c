//! General settings: language, timezone, greeting/farewell toggles.

use sea_orm::ActiveValue::Set;

use crate::bot::callbacks::{CallbackPayload, GfAction, NavTarget, ToggleTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture, Trigger};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::keyboards;

const TEXT: &str = "<b>⚙️ General chat settings</b>\n\
    \n\
    💁‍♂️ In this window, you can configure general chat settings, such as language, \
    time zone, greetings, farewells, and reports.";

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Nav(NavTarget::Language), goto_language),
            (ActionPredicate::Nav(NavTarget::Timezone), goto_timezone),
            (
                ActionPredicate::Toggle(ToggleTarget::Greeting),
                toggle_greeting,
            ),
            (
                ActionPredicate::Toggle(ToggleTarget::Farewell),
                toggle_farewell,
            ),
            (ActionPredicate::GfOpen, open_gf_menu),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        ctx.send_screen(TEXT, keyboards::general(&settings)).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.sweep(&[], true).await?;
        let settings = ctx.settings().await?;
        ctx.edit_screen(TEXT, keyboards::general(&settings)).await?;
        Ok(())
    })
}

fn goto_language(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::Language)) })
}

fn goto_timezone(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::Timezone)) })
}

fn toggle_greeting(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        let next = !settings.greeting.enabled;
        ctx.update_settings(move |row| row.greeting_enabled = Set(next))
            .await?;
        Ok(Transition::retake(true))
    })
}

fn toggle_farewell(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        let next = !settings.farewell.enabled;
        ctx.update_settings(move |row| row.farewell_enabled = Set(next))
            .await?;
        Ok(Transition::retake(true))
    })
}

/// Setup button: this screen is superseded by the block's own menu, so
/// queue it for cleanup before descending.
fn open_gf_menu(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let kind = match &ctx.trigger {
            Trigger::Callback {
                payload: CallbackPayload::Gf(kind, GfAction::Open),
                ..
            } => *kind,
            _ => return Ok(Transition::Stay),
        };
        ctx.queue_screen();
        Ok(Transition::goto(WindowId::gf(kind, GfStage::Menu)))
    })
}

fn back(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::Main)) })
}
