//! Entry window of the settings panel.

use crate::bot::callbacks::NavTarget;
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;

const TEXT: &str = "💁‍♂️ Select the settings item:";

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Nav(NavTarget::General), goto_general),
            (ActionPredicate::Nav(NavTarget::Admin), goto_admin),
        ],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.data.bot_messages_to_delete.clear();
        ctx.data.user_messages_to_delete.clear();
        ctx.send_screen(TEXT, keyboards::main_menu()).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.data.bot_messages_to_delete.clear();
        ctx.data.user_messages_to_delete.clear();
        ctx.edit_screen(TEXT, keyboards::main_menu()).await?;
        Ok(())
    })
}

fn goto_general(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::GeneralSettings)) })
}

fn goto_admin(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::AdminSettings)) })
}
