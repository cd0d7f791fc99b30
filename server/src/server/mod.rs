//! HTTP server module for Conference Central.
//!
//! - Application state
//! - Readiness probes for Postgres and Redis
//! - Router configuration

pub mod health;
pub mod routes;
pub mod state;

pub use health::{PostgresProbe, RedisProbe};
pub use routes::build_router;
pub use state::AppState;
