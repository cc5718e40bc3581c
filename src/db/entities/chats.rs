use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "chats")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub r#type: String,
    pub title: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::chat_settings::Entity")]
    ChatSettings,
}

impl Related<super::chat_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChatSettings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
