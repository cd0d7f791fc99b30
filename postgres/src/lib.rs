//! `PostgreSQL` entity store for Conference Central.
//!
//! Implements [`EntityStore`](conference_core::store::EntityStore) on top of a
//! sqlx connection pool:
//!
//! - profiles, conferences and sessions in three tables, with the ancestor
//!   path carried by `organizer_user_id` and `conference_id`
//! - filter queries rendered to SQL and streamed lazily
//! - registration as a single transaction holding row locks on the profile
//!   and the conference
//!
//! Lock waits are bounded by `lock_timeout`; a transaction that times out,
//! deadlocks or fails serialization surfaces as
//! [`ConferenceError::TransactionConflict`] so callers can retry.
//!
//! # Example
//!
//! ```no_run
//! use conference_postgres::PostgresEntityStore;
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgres://localhost/conference").await?;
//! let store = PostgresEntityStore::new(pool);
//! store.migrate().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod query;
mod rows;
mod store;

pub use store::PostgresEntityStore;

use conference_core::ConferenceError;

/// SQLSTATE codes that mean "lost a race, try again".
const RETRYABLE_SQLSTATES: [&str; 3] = [
    "40001", // serialization_failure
    "40P01", // deadlock_detected
    "55P03", // lock_not_available
];

/// Map a sqlx error onto the domain error.
pub(crate) fn db_error(error: sqlx::Error) -> ConferenceError {
    if let sqlx::Error::Database(db) = &error {
        if db
            .code()
            .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&code.as_ref()))
        {
            return ConferenceError::TransactionConflict(db.message().to_string());
        }
    }
    ConferenceError::Storage(error.to_string())
}
