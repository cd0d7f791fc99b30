//! Redis-backed announcement cache.
//!
//! Notices live under `conference:announcement:{key}` as plain strings with
//! no TTL; the refresher overwrites or deletes them.

use conference_core::store::{AnnouncementCache, BoxFuture};
use conference_core::{ConferenceError, Result};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

/// Announcement cache over a Redis `ConnectionManager`.
#[derive(Clone)]
pub struct RedisAnnouncementCache {
    conn_manager: ConnectionManager,
}

impl RedisAnnouncementCache {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::Cache`] if the client cannot be created or
    /// the first connection fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| ConferenceError::Cache(format!("Failed to create Redis client: {e}")))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            ConferenceError::Cache(format!("Failed to create Redis connection manager: {e}"))
        })?;
        Ok(Self::from_manager(conn_manager))
    }

    /// Wrap an existing connection manager.
    #[must_use]
    pub const fn from_manager(conn_manager: ConnectionManager) -> Self {
        Self { conn_manager }
    }

    fn redis_key(key: &str) -> String {
        format!("conference:announcement:{key}")
    }
}

impl AnnouncementCache for RedisAnnouncementCache {
    fn get(&self, key: &'static str) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            conn.get(Self::redis_key(key))
                .await
                .map_err(|e| ConferenceError::Cache(format!("Failed to read {key}: {e}")))
        })
    }

    fn set(&self, key: &'static str, value: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let () = conn
                .set(Self::redis_key(key), value)
                .await
                .map_err(|e| ConferenceError::Cache(format!("Failed to write {key}: {e}")))?;
            tracing::debug!(key, "Announcement cached");
            Ok(())
        })
    }

    fn delete(&self, key: &'static str) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let () = conn
                .del(Self::redis_key(key))
                .await
                .map_err(|e| ConferenceError::Cache(format!("Failed to clear {key}: {e}")))?;
            tracing::debug!(key, "Announcement cleared");
            Ok(())
        })
    }
}
