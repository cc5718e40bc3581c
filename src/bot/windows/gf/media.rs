//! Media editor for a greeting/farewell block. Accepts a photo, video,
//! GIF or sticker and stores its platform file reference.

use anyhow::{Context as _, Result};
use teloxide::types::Message;

use crate::bot::callbacks::{GfAction, NavTarget};
use crate::bot::fsm::engine::{Ctx, HandlerFuture};
use crate::bot::fsm::registry::{ActionPredicate, InputPredicate, WindowDefinition};
use crate::bot::fsm::{GfStage, Transition, WindowId};
use crate::bot::keyboards;
use crate::cache::settings::GfKind;
use crate::db::types::MediaKind;

fn prompt(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => {
            "💁‍♂️ Send the media for the greeting message: a photo, video, GIF \
            or sticker.\n\
            \n\
            💡 The message type switches to the media you send."
        }
        GfKind::Farewell => {
            "💁‍♂️ Send the media for the farewell message: a photo, video, GIF \
            or sticker.\n\
            \n\
            💡 The message type switches to the media you send."
        }
    }
}

pub fn definition() -> WindowDefinition {
    WindowDefinition {
        enter_message,
        enter_callback,
        on_leave: None,
        actions: vec![
            (ActionPredicate::Gf(GfAction::ResetMedia), reset_media),
            (ActionPredicate::Nav(NavTarget::Back), back),
        ],
        inputs: vec![
            (InputPredicate::Photo, on_photo),
            (InputPredicate::Video, on_video),
            (InputPredicate::Animation, on_animation),
            (InputPredicate::Sticker, on_sticker),
        ],
    }
}

fn enter_message(ctx: &mut Ctx) -> HandlerFuture<'_, ()> {
    Box::pin(async move {
        let kind = super::require_kind(ctx)?;
        ctx.send_screen(
            prompt(kind),
            keyboards::gf_leaf(kind, GfAction::ResetMedia),
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
            keyboards::gf_leaf(kind, GfAction::ResetMedia),
        )
        .await?;
        Ok(())
    })
}

fn extract_file(msg: &Message, media: MediaKind) -> Option<String> {
    match media {
        // The largest size of the photo carries the best quality.
        MediaKind::Photo => msg.photo().and_then(|sizes| sizes.last()).map(|s| s.file.id.0.clone()),
        MediaKind::Video => msg.video().map(|v| v.file.id.0.clone()),
        MediaKind::Gif => msg.animation().map(|a| a.file.id.0.clone()),
        MediaKind::Sticker => msg.sticker().map(|s| s.file.id.0.clone()),
        MediaKind::Text => None,
    }
}

async fn save(ctx: &mut Ctx, media: MediaKind) -> Result<Transition> {
    let kind = super::require_kind(ctx)?;
    let input = ctx.input().context("media input without a message")?;
    let input_id = input.id;
    let file = extract_file(input, media)
        .context("media input without the expected attachment")?;

    ctx.update_settings(move |row| super::store_media(row, kind, media, file))
        .await?;
    ctx.queue_screen();
    ctx.queue_preview();
    ctx.queue_user_message(input_id);
    Ok(Transition::goto(WindowId::gf(kind, GfStage::Menu)))
}

fn on_photo(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(save(ctx, MediaKind::Photo))
}

fn on_video(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(save(ctx, MediaKind::Video))
}

fn on_animation(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(save(ctx, MediaKind::Gif))
}

fn on_sticker(ctx: &mut Ctx) -> HandlerFuture<'_> {
    Box::pin(save(ctx, MediaKind::Sticker))
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
