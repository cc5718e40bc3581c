//! The settings store: a read-through redis shadow over the durable rows.
//!
//! Reads hit the cache first and fall back to the database; writes go
//! through the repo's transactional read-modify-write and then replace
//! the cache entry wholesale. The cache is never authoritative — if redis
//! is down, reads degrade to database-only and writes still succeed.

use anyhow::Result;
use std::sync::Arc;
use tracing::warn;

use crate::cache::settings::{ChatSettings, SettingsCache};
use crate::db::entities::chat_settings;
use crate::db::repo::Repo;
use crate::db::types::LanguageCode;

#[derive(Clone)]
pub struct SettingsStore {
    repo: Arc<Repo>,
    cache: SettingsCache,
}

impl SettingsStore {
    pub fn new(repo: Arc<Repo>, cache: SettingsCache) -> Self {
        Self { repo, cache }
    }

    /// Fetch a chat's settings, creating the default row if the chat has
    /// never been configured.
    pub async fn get(&self, chat_id: i64) -> Result<ChatSettings> {
        match self.cache.get(chat_id).await {
            Ok(Some(settings)) => return Ok(settings),
            Ok(None) => {}
            Err(e) => warn!("Settings cache read failed, falling back to db: {:#}", e),
        }

        let model = match self.repo.get_settings(chat_id).await? {
            Some(model) => model,
            None => self.repo.ensure_settings(chat_id, None).await?,
        };

        let settings = ChatSettings::from(model);
        if let Err(e) = self.cache.save(&settings).await {
            warn!("Failed to warm settings cache for chat {}: {:#}", chat_id, e);
        }

        Ok(settings)
    }

    /// Make the default settings row exist, seeding the language from the
    /// first-seen user's client language.
    pub async fn ensure(
        &self,
        chat_id: i64,
        language_hint: Option<LanguageCode>,
    ) -> Result<ChatSettings> {
        let model = self.repo.ensure_settings(chat_id, language_hint).await?;
        Ok(ChatSettings::from(model))
    }

    /// Mutate the durable row inside a transaction, then overwrite the
    /// cache entry with the committed state.
    pub async fn update<F>(&self, chat_id: i64, mutate: F) -> Result<ChatSettings>
    where
        F: FnOnce(&mut chat_settings::ActiveModel) + Send,
    {
        let model = self.repo.update_settings(chat_id, mutate).await?;
        let settings = ChatSettings::from(model);

        if let Err(e) = self.cache.save(&settings).await {
            // The durable write already committed; drop the stale shadow so
            // the next read repopulates it.
            warn!("Failed to refresh settings cache for chat {}: {:#}", chat_id, e);
            if let Err(e) = self.cache.delete(chat_id).await {
                warn!("Failed to drop stale settings cache for chat {}: {:#}", chat_id, e);
            }
        }

        Ok(settings)
    }
}
