//! The greeting/farewell configuration subtree.
//!
//! The two blocks are symmetric, so the five windows exist once and are
//! registered under both subtree ids; every handler reads the block it
//! operates on from the window it runs in.

pub mod kind;
pub mod media;
pub mod menu;
pub mod text;
pub mod topic;

use anyhow::{Context, Result};
use sea_orm::ActiveValue::Set;

use crate::bot::fsm::engine::Ctx;
use crate::cache::settings::GfKind;
use crate::db::entities::chat_settings;
use crate::db::types::MediaKind;

pub const MAX_GF_TEXT_LEN: usize = 1000;

/// The block the current window configures; windows in this subtree are
/// never registered outside it.
fn require_kind(ctx: &Ctx) -> Result<GfKind> {
    ctx.window
        .gf_kind()
        .context("window does not belong to a greeting/farewell subtree")
}

fn set_kind(row: &mut chat_settings::ActiveModel, kind: GfKind, value: MediaKind) {
    match kind {
        GfKind::Greeting => row.greeting_kind = Set(value),
        GfKind::Farewell => row.farewell_kind = Set(value),
    }
}

fn set_text(row: &mut chat_settings::ActiveModel, kind: GfKind, value: Option<String>) {
    match kind {
        GfKind::Greeting => row.greeting_text = Set(value),
        GfKind::Farewell => row.farewell_text = Set(value),
    }
}

fn set_topic(row: &mut chat_settings::ActiveModel, kind: GfKind, value: Option<i64>) {
    match kind {
        GfKind::Greeting => row.greeting_topic_id = Set(value),
        GfKind::Farewell => row.farewell_topic_id = Set(value),
    }
}

/// Store a media reference and switch the block's content type to match.
fn store_media(
    row: &mut chat_settings::ActiveModel,
    kind: GfKind,
    media: MediaKind,
    file: String,
) {
    let value = Set(Some(file));
    match (kind, media) {
        (GfKind::Greeting, MediaKind::Photo) => row.greeting_photo_id = value,
        (GfKind::Greeting, MediaKind::Video) => row.greeting_video_id = value,
        (GfKind::Greeting, MediaKind::Gif) => row.greeting_gif_id = value,
        (GfKind::Greeting, MediaKind::Sticker) => row.greeting_sticker_id = value,
        (GfKind::Farewell, MediaKind::Photo) => row.farewell_photo_id = value,
        (GfKind::Farewell, MediaKind::Video) => row.farewell_video_id = value,
        (GfKind::Farewell, MediaKind::Gif) => row.farewell_gif_id = value,
        (GfKind::Farewell, MediaKind::Sticker) => row.farewell_sticker_id = value,
        (_, MediaKind::Text) => return,
    }
    set_kind(row, kind, media);
}

/// Clear the media reference of the currently selected content type only.
fn clear_media(row: &mut chat_settings::ActiveModel, kind: GfKind, media: MediaKind) {
    let value = Set(None);
    match (kind, media) {
        (GfKind::Greeting, MediaKind::Photo) => row.greeting_photo_id = value,
        (GfKind::Greeting, MediaKind::Video) => row.greeting_video_id = value,
        (GfKind::Greeting, MediaKind::Gif) => row.greeting_gif_id = value,
        (GfKind::Greeting, MediaKind::Sticker) => row.greeting_sticker_id = value,
        (GfKind::Farewell, MediaKind::Photo) => row.farewell_photo_id = value,
        (GfKind::Farewell, MediaKind::Video) => row.farewell_video_id = value,
        (GfKind::Farewell, MediaKind::Gif) => row.farewell_gif_id = value,
        (GfKind::Farewell, MediaKind::Sticker) => row.farewell_sticker_id = value,
        (_, MediaKind::Text) => {}
    }
}

/// Reset every field of the block to its defaults.
fn clear_all(row: &mut chat_settings::ActiveModel, kind: GfKind) {
    set_kind(row, kind, MediaKind::default());
    set_text(row, kind, None);
    set_topic(row, kind, None);
    for media in [
        MediaKind::Photo,
        MediaKind::Video,
        MediaKind::Gif,
        MediaKind::Sticker,
    ] {
        clear_media(row, kind, media);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_media_switches_content_type() {
        let mut row = chat_settings::ActiveModel::default();
        store_media(&mut row, GfKind::Farewell, MediaKind::Gif, "gif-1".into());

        assert_eq!(row.farewell_gif_id, Set(Some("gif-1".to_string())));
        assert_eq!(row.farewell_kind, Set(MediaKind::Gif));
        // The greeting block is untouched.
        assert!(!row.greeting_gif_id.is_set());
        assert!(!row.greeting_kind.is_set());
    }

    #[test]
    fn test_clear_media_only_touches_selected_type() {
        let mut row = chat_settings::ActiveModel::default();
        clear_media(&mut row, GfKind::Greeting, MediaKind::Photo);

        assert_eq!(row.greeting_photo_id, Set(None));
        assert!(!row.greeting_video_id.is_set());
        assert!(!row.greeting_sticker_id.is_set());
    }

    #[test]
    fn test_clear_all_restores_defaults() {
        let mut row = chat_settings::ActiveModel::default();
        clear_all(&mut row, GfKind::Greeting);

        assert_eq!(row.greeting_kind, Set(MediaKind::Photo));
        assert_eq!(row.greeting_text, Set(None));
        assert_eq!(row.greeting_topic_id, Set(None));
        assert_eq!(row.greeting_photo_id, Set(None));
        assert_eq!(row.greeting_video_id, Set(None));
        assert_eq!(row.greeting_gif_id, Set(None));
        assert_eq!(row.greeting_sticker_id, Set(None));
    }
}
