//! Cached view of the bot's own membership in a chat.
//!
//! `get_chat_member` is rate-limited, so the one capability the message
//! sweep cares about is cached with a jittered TTL and refetched on miss.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use teloxide::prelude::*;
use teloxide::types::ChatMemberKind;
use tracing::debug;

use super::{jittered_ttl, SETTINGS_TTL_MAX, SETTINGS_TTL_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMember {
    pub can_delete_messages: bool,
}

#[derive(Clone)]
pub struct BotMemberCache {
    manager: ConnectionManager,
}

impl BotMemberCache {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn key(chat_id: i64) -> String {
        format!("BotMember:{}", chat_id)
    }

    /// Return the cached capability record, fetching it from the platform
    /// on a cache miss.
    pub async fn get_or_fetch(&self, bot: &Bot, chat_id: ChatId) -> Result<BotMember> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(Self::key(chat_id.0))
            .await
            .context("failed to read bot member record from cache")?;

        if let Some(raw) = raw {
            if let Ok(member) = serde_json::from_str(&raw) {
                return Ok(member);
            }
            // A stale or unreadable record just falls through to a refetch.
            debug!("Discarding unreadable bot member record for chat {}", chat_id);
        }

        let me = bot.get_me().await.context("failed to get bot identity")?;
        let member = bot
            .get_chat_member(chat_id, me.id)
            .await
            .context("failed to get bot chat member")?;

        let record = BotMember {
            can_delete_messages: match &member.kind {
                ChatMemberKind::Administrator(admin) => admin.can_delete_messages,
                ChatMemberKind::Owner(_) => true,
                _ => false,
            },
        };

        let ttl = jittered_ttl(SETTINGS_TTL_MIN, SETTINGS_TTL_MAX);
        let payload = serde_json::to_string(&record)
            .context("failed to encode bot member record")?;
        let _: () = conn
            .set_ex(Self::key(chat_id.0), payload, ttl.as_secs())
            .await
            .context("failed to cache bot member record")?;

        Ok(record)
    }
}
