//! Chat language picker.

use sea_orm::ActiveValue::Set;

use crate::bot::callbacks::CallbackPayload;
use crate::bot::fsm::engine::{Ctx, HandlerFuture, Trigger};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;

const TEXT: &str = "🌐 Choose chat language:";

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![(ActionPredicate::AnyLanguage, select_language)],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.send_screen(TEXT, keyboards::language()).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.edit_screen(TEXT, keyboards::language()).await?;
        Ok(())
    })
}

fn select_language(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let code = match &ctx.trigger {
            Trigger::Callback {
                payload: CallbackPayload::SelectLanguage(code),
                ..
            } => *code,
            _ => return Ok(Transition::Stay),
        };
        ctx.update_settings(move |row| row.language_code = Set(code))
            .await?;
        Ok(Transition::goto(WindowId::GeneralSettings))
    })
}
