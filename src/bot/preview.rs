//! Rendering of the live greeting/farewell preview shown inside the
//! settings panel. Building the payload is a pure function so the
//! content-type exclusivity rule is testable without a bot.

use anyhow::{Context, Result};
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, Message, ParseMode, ThreadId};

use crate::cache::settings::{GfConfig, GfKind};
use crate::config::MediaConfig;
use crate::db::types::MediaKind;

pub const MENTION_TOKEN: &str = "{mention}";

/// What a greeting/farewell send amounts to, independent of the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text { text: String },
    Photo { file: String, caption: String },
    Video { file: String, caption: String },
    Gif { file: String, caption: String },
    Sticker { file: String },
}

fn default_text(kind: GfKind) -> &'static str {
    match kind {
        GfKind::Greeting => "Hello, {mention}",
        GfKind::Farewell => "Goodbye, {mention}",
    }
}

fn placeholder(kind: GfKind, media: MediaKind, config: &MediaConfig) -> Option<String> {
    match (kind, media) {
        (GfKind::Greeting, MediaKind::Photo) => config.greeting_photo_id.clone(),
        (GfKind::Farewell, MediaKind::Photo) => config.farewell_photo_id.clone(),
        (_, MediaKind::Video) => config.empty_video_id.clone(),
        (_, MediaKind::Gif) => config.empty_gif_id.clone(),
        (_, MediaKind::Sticker) => config.empty_sticker_id.clone(),
        (_, MediaKind::Text) => None,
    }
}

/// Build the message payload for one block.
///
/// Only the media reference matching the selected content type is ever
/// used; references stored for other types are ignored. A missing
/// reference falls back to the configured placeholder, and if there is no
/// placeholder either, to a plain text message.
pub fn build(
    kind: GfKind,
    gf: &GfConfig,
    media_config: &MediaConfig,
    mention: &str,
) -> Payload {
    let text = gf
        .text
        .as_deref()
        .unwrap_or(default_text(kind))
        .replace(MENTION_TOKEN, mention);

    if gf.kind == MediaKind::Text {
        return Payload::Text { text };
    }

    let file = gf
        .selected_media()
        .map(str::to_string)
        .or_else(|| placeholder(kind, gf.kind, media_config));
    let Some(file) = file else {
        return Payload::Text { text };
    };

    match gf.kind {
        MediaKind::Photo => Payload::Photo {
            file,
            caption: text,
        },
        MediaKind::Video => Payload::Video {
            file,
            caption: text,
        },
        MediaKind::Gif => Payload::Gif {
            file,
            caption: text,
        },
        // Stickers carry no caption.
        MediaKind::Sticker => Payload::Sticker { file },
        MediaKind::Text => Payload::Text { text },
    }
}

/// Send a built payload into a chat (optionally into a topic).
pub async fn send(
    bot: &Bot,
    chat_id: ChatId,
    thread: Option<ThreadId>,
    payload: Payload,
) -> Result<Message> {
    let sent = match payload {
        Payload::Text { text } => {
            let mut request = bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
            if let Some(thread) = thread {
                request = request.message_thread_id(thread);
            }
            request.await
        }
        Payload::Photo { file, caption } => {
            let mut request = bot
                .send_photo(chat_id, InputFile::file_id(FileId(file)))
                .caption(caption)
                .parse_mode(ParseMode::Html);
            if let Some(thread) = thread {
                request = request.message_thread_id(thread);
            }
            request.await
        }
        Payload::Video { file, caption } => {
            let mut request = bot
                .send_video(chat_id, InputFile::file_id(FileId(file)))
                .caption(caption)
                .parse_mode(ParseMode::Html);
            if let Some(thread) = thread {
                request = request.message_thread_id(thread);
            }
            request.await
        }
        Payload::Gif { file, caption } => {
            let mut request = bot
                .send_animation(chat_id, InputFile::file_id(FileId(file)))
                .caption(caption)
                .parse_mode(ParseMode::Html);
            if let Some(thread) = thread {
                request = request.message_thread_id(thread);
            }
            request.await
        }
        Payload::Sticker { file } => {
            let mut request = bot.send_sticker(chat_id, InputFile::file_id(FileId(file)));
            if let Some(thread) = thread {
                request = request.message_thread_id(thread);
            }
            request.await
        }
    };

    sent.context("failed to send greeting/farewell message")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media_config() -> MediaConfig {
        MediaConfig {
            greeting_photo_id: Some("ph-greet".into()),
            farewell_photo_id: Some("ph-bye".into()),
            empty_video_id: Some("ph-video".into()),
            empty_gif_id: Some("ph-gif".into()),
            empty_sticker_id: Some("ph-sticker".into()),
        }
    }

    fn gf() -> GfConfig {
        crate::cache::settings::tests::sample_settings().greeting
    }

    #[test]
    fn test_selected_type_never_leaks_other_references() {
        let mut gf = gf();
        gf.photo_id = Some("stale-photo".into());
        gf.gif_id = Some("fresh-gif".into());
        gf.kind = MediaKind::Gif;

        let payload = build(GfKind::Greeting, &gf, &media_config(), "@a");
        assert_eq!(
            payload,
            Payload::Gif {
                file: "fresh-gif".into(),
                caption: "Hello, @a".into(),
            }
        );
    }

    #[test]
    fn test_mention_substitution_in_stored_text() {
        let mut gf = gf();
        gf.kind = MediaKind::Text;
        gf.text = Some("Welcome {mention}, read the rules".into());

        let payload = build(GfKind::Greeting, &gf, &media_config(), "<b>Ann</b>");
        assert_eq!(
            payload,
            Payload::Text {
                text: "Welcome <b>Ann</b>, read the rules".into(),
            }
        );
    }

    #[test]
    fn test_placeholder_fallback_per_block() {
        let mut gf = gf();
        gf.kind = MediaKind::Photo;

        let greeting = build(GfKind::Greeting, &gf, &media_config(), "@a");
        assert!(matches!(greeting, Payload::Photo { ref file, .. } if file == "ph-greet"));

        let farewell = build(GfKind::Farewell, &gf, &media_config(), "@a");
        assert!(matches!(farewell, Payload::Photo { ref file, .. } if file == "ph-bye"));
        assert!(matches!(farewell, Payload::Photo { ref caption, .. } if caption == "Goodbye, @a"));
    }

    #[test]
    fn test_degrades_to_text_without_placeholder() {
        let mut gf = gf();
        gf.kind = MediaKind::Sticker;

        let payload = build(GfKind::Greeting, &gf, &MediaConfig::default(), "@a");
        assert_eq!(
            payload,
            Payload::Text {
                text: "Hello, @a".into(),
            }
        );
    }

    #[test]
    fn test_sticker_drops_caption() {
        let mut gf = gf();
        gf.kind = MediaKind::Sticker;
        gf.sticker_id = Some("st-1".into());
        gf.text = Some("ignored".into());

        let payload = build(GfKind::Greeting, &gf, &media_config(), "@a");
        assert_eq!(payload, Payload::Sticker { file: "st-1".into() });
    }
}
