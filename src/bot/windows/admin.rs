//! Administrative settings: the reports feature and its routing policy.

use sea_orm::ActiveValue::Set;

use crate::bot::callbacks::{NavTarget, ToggleTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;

const TEXT: &str = "👮 Admin settings\n\
    \n\
    💁‍♂️ In this window, you can configure the administrative settings of the chat.";

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (
                ActionPredicate::Toggle(ToggleTarget::Reports),
                toggle_reports,
            ),
            (
                ActionPredicate::Nav(NavTarget::ReportsPolicy),
                goto_reports_policy,
            ),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        ctx.send_screen(TEXT, keyboards::admin(&settings)).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        ctx.edit_screen(TEXT, keyboards::admin(&settings)).await?;
        Ok(())
    })
}

fn toggle_reports(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let settings = ctx.settings().await?;
        let next = !settings.reports_enabled;
        ctx.update_settings(move |row| row.reports_enabled = Set(next))
            .await?;
        Ok(Transition::retake(true))
    })
}

fn goto_reports_policy(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::ReportsPolicy)) })
}

fn back(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::Main)) })
}
