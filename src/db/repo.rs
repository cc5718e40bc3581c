use anyhow::{Context, Result};
use chrono::Local;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    Set, TransactionTrait,
};

use super::entities::{chat_settings, chats};
use crate::db::types::LanguageCode;

pub struct Repo {
    db: DatabaseConnection,
}

impl Repo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn ping(&self) -> Result<()> {
        self.db.ping().await.context("Database ping failed")
    }

    // ==================== Chats ====================

    /// Create or update a chat (atomic upsert).
    /// On conflict: only refreshes the title, everything else is preserved.
    pub async fn upsert_chat(
        &self,
        chat_id: i64,
        chat_type: String,
        title: Option<String>,
    ) -> Result<chats::Model> {
        let now = Local::now().naive_local();

        let new_chat = chats::ActiveModel {
            id: Set(chat_id),
            r#type: Set(chat_type),
            title: Set(title),
            created_at: Set(now),
        };

        chats::Entity::insert(new_chat)
            .on_conflict(
                OnConflict::column(chats::Column::Id)
                    .update_column(chats::Column::Title)
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .context("Failed to upsert chat")?;

        chats::Entity::find_by_id(chat_id)
            .one(&self.db)
            .await
            .context("Failed to fetch upserted chat")?
            .ok_or_else(|| anyhow::anyhow!("Chat {} not found after upsert", chat_id))
    }

    // ==================== Chat settings ====================

    /// Create the settings row for a chat if it does not exist yet, then
    /// return it. New rows get defaults, except the language code which is
    /// seeded from the first-seen user's client language when supported.
    pub async fn ensure_settings(
        &self,
        chat_id: i64,
        language_hint: Option<LanguageCode>,
    ) -> Result<chat_settings::Model> {
        let defaults = chat_settings::ActiveModel {
            id: Set(chat_id),
            language_code: Set(language_hint.unwrap_or_default()),
            timezone: Set(None),
            admin_tools_enabled: Set(true),
            reports_enabled: Set(true),
            reports_policy: Set(Default::default()),
            reports_special_chat_id: Set(None),
            greeting_enabled: Set(true),
            greeting_kind: Set(Default::default()),
            greeting_text: Set(None),
            greeting_photo_id: Set(None),
            greeting_video_id: Set(None),
            greeting_gif_id: Set(None),
            greeting_sticker_id: Set(None),
            greeting_topic_id: Set(None),
            farewell_enabled: Set(true),
            farewell_kind: Set(Default::default()),
            farewell_text: Set(None),
            farewell_photo_id: Set(None),
            farewell_video_id: Set(None),
            farewell_gif_id: Set(None),
            farewell_sticker_id: Set(None),
            farewell_topic_id: Set(None),
        };

        chat_settings::Entity::insert(defaults)
            .on_conflict(
                OnConflict::column(chat_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec(&self.db)
            .await
            .context("Failed to insert default chat settings")?;

        self.get_settings(chat_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Settings for chat {} not found after insert", chat_id))
    }

    pub async fn get_settings(&self, chat_id: i64) -> Result<Option<chat_settings::Model>> {
        chat_settings::Entity::find_by_id(chat_id)
            .one(&self.db)
            .await
            .context("Failed to get chat settings")
    }

    /// Read-modify-write a settings row inside a transaction.
    ///
    /// All settings mutations in the codebase go through this method; no
    /// caller is allowed to write the row outside of it.
    pub async fn update_settings<F>(&self, chat_id: i64, mutate: F) -> Result<chat_settings::Model>
    where
        F: FnOnce(&mut chat_settings::ActiveModel) + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let model = chat_settings::Entity::find_by_id(chat_id)
            .one(&txn)
            .await
            .context("Failed to load chat settings for update")?
            .ok_or_else(|| anyhow::anyhow!("Settings for chat {} not found", chat_id))?;

        let mut active = model.into_active_model();
        mutate(&mut active);

        let updated = active
            .update(&txn)
            .await
            .context("Failed to update chat settings")?;

        txn.commit().await.context("Failed to commit transaction")?;

        Ok(updated)
    }
}
