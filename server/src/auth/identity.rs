//! Redis-backed identity lookup.
//!
//! Tokens are issued by an external identity service, which stores the
//! caller under `conference:identity:{token}` as JSON
//! (`{"user_id": ..., "email": ..., "nickname": ...}`) with its own TTL.
//! This adapter only reads.

use conference_core::providers::IdentityProvider;
use conference_core::store::BoxFuture;
use conference_core::{Caller, ConferenceError, Result};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Identity provider reading pre-issued tokens from Redis.
#[derive(Clone)]
pub struct RedisIdentityProvider {
    conn_manager: ConnectionManager,
}

impl RedisIdentityProvider {
    /// Wrap a connection manager.
    #[must_use]
    pub const fn new(conn_manager: ConnectionManager) -> Self {
        Self { conn_manager }
    }

    fn token_key(token: &str) -> String {
        format!("conference:identity:{token}")
    }
}

impl IdentityProvider for RedisIdentityProvider {
    fn resolve(&self, token: &str) -> BoxFuture<'_, Result<Option<Caller>>> {
        let key = Self::token_key(token);
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let payload: Option<String> = conn
                .get(&key)
                .await
                .map_err(|e| ConferenceError::Cache(format!("Failed to look up identity: {e}")))?;

            let Some(payload) = payload else {
                return Ok(None);
            };
            match serde_json::from_str::<Caller>(&payload) {
                Ok(caller) => Ok(Some(caller)),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed identity record");
                    Ok(None)
                },
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn identity_records_are_plain_json() {
        let caller: Caller = serde_json::from_str(
            r#"{"user_id":"u-1","email":"ann@example.com","nickname":"ann"}"#,
        )
        .unwrap();
        assert_eq!(caller.user_id.as_str(), "u-1");
        assert_eq!(RedisIdentityProvider::token_key("abc"), "conference:identity:abc");
    }
}
