//! Cache representation of a chat's settings.
//!
//! The durable row is flat; the cached value groups the two symmetric
//! greeting/farewell blocks into [`GfConfig`] sub-records, which is what
//! the windows and the preview builder work with.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use super::{jittered_ttl, SETTINGS_TTL_MAX, SETTINGS_TTL_MIN};
use crate::db::entities::chat_settings;
use crate::db::types::{LanguageCode, MediaKind, ReportPolicy};

/// Which of the two symmetric message blocks is being worked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GfKind {
    Greeting,
    Farewell,
}

impl GfKind {
    pub fn noun(&self) -> &'static str {
        match self {
            GfKind::Greeting => "greeting",
            GfKind::Farewell => "farewell",
        }
    }
}

/// One greeting or farewell configuration block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GfConfig {
    pub enabled: bool,
    pub kind: MediaKind,
    pub text: Option<String>,
    pub photo_id: Option<String>,
    pub video_id: Option<String>,
    pub gif_id: Option<String>,
    pub sticker_id: Option<String>,
    pub topic_id: Option<i64>,
}

impl GfConfig {
    /// The media reference selected by the content-type selector, if any.
    /// References stored for other content types are deliberately ignored.
    pub fn selected_media(&self) -> Option<&str> {
        match self.kind {
            MediaKind::Text => None,
            MediaKind::Photo => self.photo_id.as_deref(),
            MediaKind::Video => self.video_id.as_deref(),
            MediaKind::Gif => self.gif_id.as_deref(),
            MediaKind::Sticker => self.sticker_id.as_deref(),
        }
    }

    /// True when every field is back at its default.
    pub fn is_default(&self) -> bool {
        self.kind == MediaKind::default()
            && self.text.is_none()
            && self.photo_id.is_none()
            && self.video_id.is_none()
            && self.gif_id.is_none()
            && self.sticker_id.is_none()
            && self.topic_id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSettings {
    pub id: i64,
    pub language_code: LanguageCode,
    pub timezone: Option<String>,
    pub admin_tools_enabled: bool,
    pub reports_enabled: bool,
    pub reports_policy: ReportPolicy,
    pub reports_special_chat_id: Option<i64>,
    pub greeting: GfConfig,
    pub farewell: GfConfig,
}

impl ChatSettings {
    pub fn gf(&self, kind: GfKind) -> &GfConfig {
        match kind {
            GfKind::Greeting => &self.greeting,
            GfKind::Farewell => &self.farewell,
        }
    }
}

impl From<chat_settings::Model> for ChatSettings {
    fn from(m: chat_settings::Model) -> Self {
        Self {
            id: m.id,
            language_code: m.language_code,
            timezone: m.timezone,
            admin_tools_enabled: m.admin_tools_enabled,
            reports_enabled: m.reports_enabled,
            reports_policy: m.reports_policy,
            reports_special_chat_id: m.reports_special_chat_id,
            greeting: GfConfig {
                enabled: m.greeting_enabled,
                kind: m.greeting_kind,
                text: m.greeting_text,
                photo_id: m.greeting_photo_id,
                video_id: m.greeting_video_id,
                gif_id: m.greeting_gif_id,
                sticker_id: m.greeting_sticker_id,
                topic_id: m.greeting_topic_id,
            },
            farewell: GfConfig {
                enabled: m.farewell_enabled,
                kind: m.farewell_kind,
                text: m.farewell_text,
                photo_id: m.farewell_photo_id,
                video_id: m.farewell_video_id,
                gif_id: m.farewell_gif_id,
                sticker_id: m.farewell_sticker_id,
                topic_id: m.farewell_topic_id,
            },
        }
    }
}

/// Read/write access to the cached settings shadow.
#[derive(Clone)]
pub struct SettingsCache {
    manager: ConnectionManager,
}

impl SettingsCache {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn key(chat_id: i64) -> String {
        format!("ChatSettings:{}", chat_id)
    }

    pub async fn get(&self, chat_id: i64) -> Result<Option<ChatSettings>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(Self::key(chat_id))
            .await
            .context("failed to read chat settings from cache")?;

        match raw {
            Some(raw) => {
                let settings = serde_json::from_str(&raw)
                    .context("failed to decode cached chat settings")?;
                Ok(Some(settings))
            }
            None => Ok(None),
        }
    }

    pub async fn save(&self, settings: &ChatSettings) -> Result<()> {
        let ttl = jittered_ttl(SETTINGS_TTL_MIN, SETTINGS_TTL_MAX);
        let payload =
            serde_json::to_string(settings).context("failed to encode chat settings")?;

        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(Self::key(settings.id), payload, ttl.as_secs())
            .await
            .context("failed to write chat settings to cache")?;

        Ok(())
    }

    pub async fn delete(&self, chat_id: i64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn
            .del(Self::key(chat_id))
            .await
            .context("failed to delete cached chat settings")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_settings() -> ChatSettings {
        ChatSettings {
            id: -100123,
            language_code: LanguageCode::En,
            timezone: None,
            admin_tools_enabled: true,
            reports_enabled: true,
            reports_policy: ReportPolicy::MainChat,
            reports_special_chat_id: None,
            greeting: GfConfig {
                enabled: true,
                kind: MediaKind::Photo,
                text: None,
                photo_id: None,
                video_id: None,
                gif_id: None,
                sticker_id: None,
                topic_id: None,
            },
            farewell: GfConfig {
                enabled: true,
                kind: MediaKind::Photo,
                text: None,
                photo_id: None,
                video_id: None,
                gif_id: None,
                sticker_id: None,
                topic_id: None,
            },
        }
    }

    #[test]
    fn test_selected_media_follows_kind() {
        let mut gf = sample_settings().greeting;
        gf.photo_id = Some("stale-photo".into());
        gf.gif_id = Some("fresh-gif".into());

        gf.kind = MediaKind::Gif;
        assert_eq!(gf.selected_media(), Some("fresh-gif"));

        gf.kind = MediaKind::Photo;
        assert_eq!(gf.selected_media(), Some("stale-photo"));

        gf.kind = MediaKind::Text;
        assert_eq!(gf.selected_media(), None);

        // A kind with no stored reference yields nothing even though other
        // references exist.
        gf.kind = MediaKind::Sticker;
        assert_eq!(gf.selected_media(), None);
    }

    #[test]
    fn test_is_default_detects_leftovers() {
        let mut gf = sample_settings().greeting;
        assert!(gf.is_default());

        gf.text = Some("hello {mention}".into());
        assert!(!gf.is_default());
    }

    #[test]
    fn test_json_roundtrip() {
        let settings = sample_settings();
        let raw = serde_json::to_string(&settings).unwrap();
        let back: ChatSettings = serde_json::from_str(&raw).unwrap();
        assert_eq!(settings, back);
    }
}
