use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::types::{LanguageCode, MediaKind, ReportPolicy};

/// Per-chat settings row, 1:1 with `chats`.
///
/// The greeting and farewell column blocks are symmetric; which media
/// reference is live is selected by the `*_kind` column.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "chat_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub language_code: LanguageCode,
    pub timezone: Option<String>,
    pub admin_tools_enabled: bool,
    pub reports_enabled: bool,
    pub reports_policy: ReportPolicy,
    pub reports_special_chat_id: Option<i64>,

    pub greeting_enabled: bool,
    pub greeting_kind: MediaKind,
    pub greeting_text: Option<String>,
    pub greeting_photo_id: Option<String>,
    pub greeting_video_id: Option<String>,
    pub greeting_gif_id: Option<String>,
    pub greeting_sticker_id: Option<String>,
    pub greeting_topic_id: Option<i64>,

    pub farewell_enabled: bool,
    pub farewell_kind: MediaKind,
    pub farewell_text: Option<String>,
    pub farewell_photo_id: Option<String>,
    pub farewell_video_id: Option<String>,
    pub farewell_gif_id: Option<String>,
    pub farewell_sticker_id: Option<String>,
    pub farewell_topic_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chats::Entity",
        from = "Column::Id",
        to = "super::chats::Column::Id"
    )]
    Chat,
}

impl Related<super::chats::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chat.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
