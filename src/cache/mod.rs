//! Redis-backed caches and ephemeral stores.
//!
//! All values are stored as JSON under `TypeName:{key}` keys. Connections
//! go through a single [`ConnectionManager`] that is cheap to clone per
//! call.

pub mod chat_member;
pub mod pending;
pub mod settings;

use anyhow::{Context, Result};
use rand::RngExt;
use redis::aio::ConnectionManager;
use std::time::Duration;
use tracing::info;

/// Cached settings live for a random duration in this band so that many
/// chats warmed at the same time do not expire together.
pub const SETTINGS_TTL_MIN: Duration = Duration::from_secs(45 * 60);
pub const SETTINGS_TTL_MAX: Duration = Duration::from_secs(90 * 60);

pub async fn connect(redis_url: &str) -> Result<ConnectionManager> {
    let client = redis::Client::open(redis_url.to_string())
        .with_context(|| format!("failed to open redis client for {}", redis_url))?;
    let manager = client
        .get_connection_manager()
        .await
        .context("failed to connect to redis")?;

    info!("Connected to redis");
    Ok(manager)
}

/// Pick a TTL uniformly from `[min, max]`.
///
/// Shared stampede-avoidance policy for every cache entry with a jittered
/// lifetime; call sites never compute their own band.
pub fn jittered_ttl(min: Duration, max: Duration) -> Duration {
    debug_assert!(min <= max);
    Duration::from_secs(rand::rng().random_range(min.as_secs()..=max.as_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jittered_ttl_stays_in_band() {
        let min = Duration::from_secs(45 * 60);
        let max = Duration::from_secs(90 * 60);
        for _ in 0..1000 {
            let ttl = jittered_ttl(min, max);
            assert!(ttl >= min, "ttl {:?} below band", ttl);
            assert!(ttl <= max, "ttl {:?} above band", ttl);
        }
    }

    #[test]
    fn test_jittered_ttl_degenerate_band() {
        let fixed = Duration::from_secs(60);
        assert_eq!(jittered_ttl(fixed, fixed), fixed);
    }
}
