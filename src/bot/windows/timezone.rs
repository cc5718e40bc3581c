//! Chat timezone input window. Accepts IANA zone names as free text.

use anyhow::Context as _;
use chrono_tz::Tz;
use sea_orm::ActiveValue::Set;

use crate::bot::callbacks::NavTarget;
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, InputPredicate, WindowDefinition};
use crate::bot::fsm::{Transition, WindowId};
use crate::bot::keyboards;

const TEXT: &str = "⏰ Write the name of your time zone (for example, \
    <code>Europe/Kyiv</code>).\n\
    \n\
    💡 The full list of time zone names can be found \
    <a href=\"https://en.wikipedia.org/wiki/List_of_tz_database_time_zones\">here</a>.";

const RETRY_TEXT: &str = "💁‍♂️ The time zone name must be in the \
    <code>Continent/City</code> format, for example:\n\
    \n\
    <blockquote><code>Europe/Kyiv</code>\n\
    <code>Europe/Warsaw</code>\n\
    <code>Asia/Tokyo</code></blockquote>\n\
    \n\
    💡 Enter another name or use /cancel to cancel.";

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![(ActionPredicate::Nav(NavTarget::Back), back)],
        inputs: vec![(InputPredicate::Text, on_text)],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.send_screen(TEXT, keyboards::timezone()).await?;
        Ok(())
    })
}

fn enter_callback(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        ctx.edit_screen(TEXT, keyboards::timezone()).await?;
        Ok(())
    })
}

fn on_text(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move {
        let input = ctx.input().context("text input without a message")?;
        let text = input
            .text()
            .context("text input without text")?
            .trim()
            .to_string();
        let input_id = input.id;
        ctx.queue_user_message(input_id);

        let Ok(tz) = text.parse::<Tz>() else {
            // The old prompt loses its keyboard and a fresh one carries
            // the format hint, so the owner always has a live Back button.
            ctx.edit_screen_plain("⚠️ Unknown time zone.").await?;
            ctx.queue_screen();
            ctx.send_screen(RETRY_TEXT, keyboards::timezone()).await?;
            return Ok(Transition::Stay);
        };

        let name = tz.name().to_string();
        ctx.update_settings(move |row| row.timezone = Set(Some(name)))
            .await?;
        ctx.edit_screen_plain(&format!(
            "✅ Time zone saved: <blockquote><code>{}</code></blockquote>",
            tz.name()
        ))
        .await?;
        ctx.queue_screen();
        Ok(Transition::goto(WindowId::GeneralSettings))
    })
}

fn back(_ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(async move { Ok(Transition::goto(WindowId::GeneralSettings)) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_zone_parses() {
        assert!("Europe/Kyiv".parse::<Tz>().is_ok());
        assert_eq!(
            "Asia/Tokyo".parse::<Tz>().map(|tz| tz.name()),
            Ok("Asia/Tokyo")
        );
    }

    #[test]
    fn test_unknown_zone_is_rejected() {
        assert!("Not/AZone".parse::<Tz>().is_err());
        assert!("kyiv".parse::<Tz>().is_err());
    }
}
