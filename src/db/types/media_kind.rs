use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Content type of a greeting/farewell message.
///
/// Exactly one of the per-type media references on a settings row is
/// meaningful at a time; this selector decides which one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Deserialize, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "photo")]
    Photo,
    #[sea_orm(string_value = "video")]
    Video,
    #[sea_orm(string_value = "gif")]
    Gif,
    #[sea_orm(string_value = "sticker")]
    Sticker,
}

impl Default for MediaKind {
    fn default() -> Self {
        MediaKind::Photo
    }
}

impl MediaKind {
    pub const ALL: [MediaKind; 5] = [
        MediaKind::Text,
        MediaKind::Photo,
        MediaKind::Video,
        MediaKind::Gif,
        MediaKind::Sticker,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MediaKind::Text),
            "photo" => Some(MediaKind::Photo),
            "video" => Some(MediaKind::Video),
            "gif" => Some(MediaKind::Gif),
            "sticker" => Some(MediaKind::Sticker),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Text => "text",
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Gif => "gif",
            MediaKind::Sticker => "sticker",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Text => "📝 Text",
            MediaKind::Photo => "🖼 Photo",
            MediaKind::Video => "🎬 Video",
            MediaKind::Gif => "🎞 GIF",
            MediaKind::Sticker => "🩹 Sticker",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
