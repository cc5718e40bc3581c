//! Where member reports are delivered: into the chat itself or into a
//! dedicated special chat.

use crate::bot::callbacks::NavTarget;
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;
use crate::db::types::ReportPolicy;

fn text(policy: ReportPolicy, special_chat_id: Option<i64>) -> String {
    let policy_line = match policy {
        ReportPolicy::MainChat => "📍 Reports are currently sent to this chat.",
        ReportPolicy::SpecialChat => {
            "📍 Reports are currently sent to a dedicated chat."
        }
    };
    let chat_line = match special_chat_id {
        Some(id) => format!("💾 Chat for reports: <blockquote>{}</blockquote>", id),
        None => "💾 Chat for reports: ❌".to_string(),
    };
    format!(
        "📕 Reports policy\n\
        \n\
        {}\n\
        {}\n\
        \n\
        💁‍♂️ Set up a dedicated chat to receive reports there instead of in \
        this chat.",
        policy_line, chat_line
    )
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: Some(on_leave),
        actions: vec![
            (
                ActionPredicate::Nav(NavTarget::ReportsSpecialChat),
                goto_special_chat,
            ),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        let settings = ctx.settings().await?;
        let text = text(settings.reports_policy, settings.reports_special_chat_id);
        ctx.send_screen(&text, keyboards::reports_policy()).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        let settings = ctx.settings().await?;
        let text = text(settings.reports_policy, settings.reports_special_chat_id);
        ctx.edit_screen(&text, keyboards::reports_policy()).await?;
        Ok(())
    })
}

/// Leaving the policy subtree invalidates any assignment the owner
/// started but never confirmed.
fn on_leave(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.deps.pending.delete_for_user(ctx.user.id.0).await?;
        Ok(())
    })
}

fn goto_special_chat(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::ReportsSpecialChat)) })
}

fn back(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto_silent(WindowId::AdminSettings)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_reflects_assignment_state() {
        let unset = text(ReportPolicy::MainChat, None);
        assert!(unset.contains("this chat"));
        assert!(unset.contains("❌"));

        let set = text(ReportPolicy::SpecialChat, Some(-1009));
        assert!(set.contains("dedicated"));
        assert!(set.contains("-1009"));
    }
}
