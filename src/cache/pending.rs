//! Pending "assign reports special chat" records.
//!
//! An admin opens the assignment window in the origin chat; the bot hands
//! them a public token. The actual assignment happens later, from inside
//! the target chat, via `/set_reports_special_chat <public>:<secret>`.
//! The token pair is derived as
//!
//! ```text
//! secret = h(origin_chat_id, user_id, entropy)
//! public = h(origin_chat_id, user_id, secret)
//! ```
//!
//! where `h` is a short md5 fingerprint. Confirmation requires the stored
//! secret, the candidate secret, and the secret recomputed from stored
//! entropy to all agree, so a record corrupted (or tampered with) in the
//! store fails even when the candidate matches it.

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PENDING_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAssignment {
    pub origin_chat_id: i64,
    pub origin_message_id: i32,
    pub entropy: String,
    pub secret_token: String,
}

/// Short non-cryptographic fingerprint: first 8 hex chars of md5.
fn fingerprint(chat_id: i64, user_id: u64, tail: &str) -> String {
    let digest = md5::compute(format!("{}:{}:{}", chat_id, user_id, tail));
    let hex = format!("{:x}", digest);
    hex[..8].to_string()
}

pub fn derive_secret_token(chat_id: i64, user_id: u64, entropy: &str) -> String {
    fingerprint(chat_id, user_id, entropy)
}

pub fn derive_public_token(chat_id: i64, user_id: u64, secret_token: &str) -> String {
    fingerprint(chat_id, user_id, secret_token)
}

/// The triple-equality confirmation check.
///
/// `recomputed == stored == candidate`; any single mismatch rejects.
pub fn verify(pending: &PendingAssignment, user_id: u64, secret_candidate: &str) -> bool {
    let recomputed = derive_secret_token(pending.origin_chat_id, user_id, &pending.entropy);

    recomputed == pending.secret_token
        && recomputed == secret_candidate
        && pending.secret_token == secret_candidate
}

#[derive(Clone)]
pub struct PendingStore {
    manager: ConnectionManager,
}

impl PendingStore {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    fn key(user_id: u64, public_token: &str) -> String {
        format!("PendingAssignment:{}:{}", user_id, public_token)
    }

    /// Store a pending assignment and return its public token.
    pub async fn create(
        &self,
        origin_chat_id: i64,
        origin_message_id: i32,
        user_id: u64,
    ) -> Result<String> {
        let entropy = uuid::Uuid::new_v4().simple().to_string();
        let secret_token = derive_secret_token(origin_chat_id, user_id, &entropy);
        let public_token = derive_public_token(origin_chat_id, user_id, &secret_token);

        let record = PendingAssignment {
            origin_chat_id,
            origin_message_id,
            entropy,
            secret_token,
        };
        let payload = serde_json::to_string(&record)
            .context("failed to encode pending assignment")?;

        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(
                Self::key(user_id, &public_token),
                payload,
                PENDING_TTL.as_secs(),
            )
            .await
            .context("failed to store pending assignment")?;

        Ok(public_token)
    }

    pub async fn resolve(
        &self,
        user_id: u64,
        public_token: &str,
    ) -> Result<Option<PendingAssignment>> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(Self::key(user_id, public_token))
            .await
            .context("failed to read pending assignment")?;

        match raw {
            Some(raw) => {
                let record = serde_json::from_str(&raw)
                    .context("failed to decode pending assignment")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Resolve and check the secret. Returns the record only when the
    /// triple equality holds; the caller must delete the user's pending
    /// records afterwards (single-use).
    pub async fn confirm(
        &self,
        user_id: u64,
        public_token: &str,
        secret_candidate: &str,
    ) -> Result<Option<PendingAssignment>> {
        let Some(pending) = self.resolve(user_id, public_token).await? else {
            return Ok(None);
        };

        if !verify(&pending, user_id, secret_candidate) {
            return Ok(None);
        }

        Ok(Some(pending))
    }

    /// Remove every pending record of a user. Called on confirmation, on
    /// conversation exit, and whenever the assignment window is left.
    pub async fn delete_for_user(&self, user_id: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = conn
            .keys(format!("PendingAssignment:{}:*", user_id))
            .await
            .context("failed to list pending assignments")?;

        if !keys.is_empty() {
            let _: () = conn
                .del(keys)
                .await
                .context("failed to delete pending assignments")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAT: i64 = -1001234567890;
    const USER: u64 = 4242;

    fn make_pending(entropy: &str) -> PendingAssignment {
        let secret = derive_secret_token(CHAT, USER, entropy);
        PendingAssignment {
            origin_chat_id: CHAT,
            origin_message_id: 17,
            entropy: entropy.to_string(),
            secret_token: secret,
        }
    }

    #[test]
    fn test_tokens_are_deterministic_and_distinct() {
        let secret = derive_secret_token(CHAT, USER, "abc");
        assert_eq!(secret, derive_secret_token(CHAT, USER, "abc"));
        assert_eq!(secret.len(), 8);

        let public = derive_public_token(CHAT, USER, &secret);
        assert_ne!(public, secret);

        // Different entropy, different secret.
        assert_ne!(secret, derive_secret_token(CHAT, USER, "abd"));
        // Different user, different secret.
        assert_ne!(secret, derive_secret_token(CHAT, USER + 1, "abc"));
    }

    #[test]
    fn test_verify_accepts_matching_pair() {
        let pending = make_pending("entropy-1");
        let candidate = pending.secret_token.clone();
        assert!(verify(&pending, USER, &candidate));
    }

    #[test]
    fn test_verify_rejects_wrong_candidate() {
        let pending = make_pending("entropy-1");
        assert!(!verify(&pending, USER, "deadbeef"));
    }

    #[test]
    fn test_verify_rejects_corrupted_entropy() {
        // The candidate matches the stored secret, but the secret can no
        // longer be recomputed from the stored entropy.
        let mut pending = make_pending("entropy-1");
        pending.entropy = "entropy-2".to_string();

        let candidate = pending.secret_token.clone();
        assert!(!verify(&pending, USER, &candidate));
    }

    #[test]
    fn test_verify_rejects_wrong_user() {
        let pending = make_pending("entropy-1");
        let candidate = pending.secret_token.clone();
        assert!(!verify(&pending, USER + 1, &candidate));
    }
}
