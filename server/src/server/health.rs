//! Readiness probes for the server's backing services.

use conference_core::store::BoxFuture;
use conference_web::handlers::health::ReadinessProbe;
use redis::aio::ConnectionManager;
use sqlx::PgPool;

/// Checks the Postgres pool with `SELECT 1`.
pub struct PostgresProbe {
    pool: PgPool,
}

impl PostgresProbe {
    /// Probe `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReadinessProbe for PostgresProbe {
    fn name(&self) -> &'static str {
        "database"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
    }
}

/// Checks Redis with `PING`.
pub struct RedisProbe {
    conn_manager: ConnectionManager,
}

impl RedisProbe {
    /// Probe through `conn_manager`.
    #[must_use]
    pub const fn new(conn_manager: ConnectionManager) -> Self {
        Self { conn_manager }
    }
}

impl ReadinessProbe for RedisProbe {
    fn name(&self) -> &'static str {
        "cache"
    }

    fn check(&self) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            let mut conn = self.conn_manager.clone();
            let pong: String = redis::cmd("PING")
                .query_async(&mut conn)
                .await
                .map_err(|e| e.to_string())?;
            if pong == "PONG" {
                Ok(())
            } else {
                Err(format!("unexpected PING reply: {pong}"))
            }
        })
    }
}
