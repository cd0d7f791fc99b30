//! Collaborator traits: entity store, announcement cache, task queue.
//!
//! # Implementations
//!
//! - `PostgresEntityStore` (in `conference-postgres`): production store
//! - `RedisAnnouncementCache` / `ChannelTaskQueue` (in `conference-server`)
//! - In-memory doubles for all three (in `conference-testing`)
//!
//! # Dyn Compatibility
//!
//! Methods return boxed futures instead of using `async fn` so the traits can
//! be shared as `Arc<dyn EntityStore>` and captured by effects.

use crate::error::Result;
use crate::filter::ConferenceQuery;
use crate::key::{ConferenceKey, SessionKey};
use crate::registration::RegistrationState;
use crate::tasks::Task;
use crate::types::{Conference, NewConference, NewSession, Profile, Session, UserId};
use chrono::NaiveDate;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

/// Boxed, sendable future returned by the collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Lazy, single-pass stream of query results.
pub type ConferenceStream<'a> = Pin<Box<dyn Stream<Item = Result<Conference>> + Send + 'a>>;

/// Mutation applied to a profile and a conference inside one transaction.
///
/// Returning `Err` rolls the transaction back; nothing is written.
pub type RegistrationTxn = Box<dyn FnOnce(&mut RegistrationState) -> Result<bool> + Send>;

/// Mutation applied to a single profile atomically.
///
/// Returning `Err` discards the change.
pub type ProfileTxn = Box<dyn FnOnce(&mut Profile) -> Result<bool> + Send>;

/// Mutation applied to a single conference atomically.
///
/// Returning `Err` discards the change.
pub type ConferenceTxn = Box<dyn FnOnce(&mut Conference) -> Result<()> + Send>;

/// Key-based entity storage with ancestor queries and transactions.
///
/// # Consistency
///
/// Single-entity writes are atomic. [`EntityStore::transact_registration`]
/// is atomic across the profile and the conference: concurrent
/// registrations and organizer edits on the same conference serialize.
/// A transaction that loses a lock race fails with
/// [`crate::ConferenceError::TransactionConflict`].
pub trait EntityStore: Send + Sync {
    // ── Profiles ──────────────────────────────────────────────

    /// Load a profile.
    fn get_profile(&self, user_id: UserId) -> BoxFuture<'_, Result<Option<Profile>>>;

    /// Load several profiles; missing ones are skipped.
    fn get_profiles(&self, user_ids: Vec<UserId>) -> BoxFuture<'_, Result<Vec<Profile>>>;

    /// Insert or replace a profile.
    fn put_profile(&self, profile: Profile) -> BoxFuture<'_, Result<()>>;

    /// Atomically read-modify-write a profile.
    ///
    /// Fails with `NotFound` if the profile does not exist.
    fn transact_profile(&self, user_id: UserId, txn: ProfileTxn) -> BoxFuture<'_, Result<bool>>;

    // ── Conferences ───────────────────────────────────────────

    /// Allocate an id and store a new conference.
    fn insert_conference(&self, conference: NewConference) -> BoxFuture<'_, Result<Conference>>;

    /// Load a conference.
    fn get_conference(&self, key: ConferenceKey) -> BoxFuture<'_, Result<Option<Conference>>>;

    /// Load several conferences in key order; missing ones are skipped.
    fn get_conferences(&self, keys: Vec<ConferenceKey>) -> BoxFuture<'_, Result<Vec<Conference>>>;

    /// Atomically read-modify-write a conference and return the result.
    ///
    /// Fails with `NotFound` if the conference does not exist.
    fn update_conference(
        &self,
        key: ConferenceKey,
        txn: ConferenceTxn,
    ) -> BoxFuture<'_, Result<Conference>>;

    /// Conferences organized by `organizer`, ordered by name.
    fn conferences_by_organizer(&self, organizer: UserId) -> BoxFuture<'_, Result<Vec<Conference>>>;

    /// Run a compiled filter query; results arrive lazily in query order.
    fn query_conferences(&self, query: ConferenceQuery) -> ConferenceStream<'_>;

    /// Conferences with `min <= seatsAvailable <= max`, ordered by name.
    fn conferences_with_seats_between(
        &self,
        min: i32,
        max: i32,
    ) -> BoxFuture<'_, Result<Vec<Conference>>>;

    // ── Sessions ──────────────────────────────────────────────

    /// Allocate an id and store a new session under its conference.
    fn insert_session(&self, session: NewSession) -> BoxFuture<'_, Result<Session>>;

    /// Load a session.
    fn get_session(&self, key: SessionKey) -> BoxFuture<'_, Result<Option<Session>>>;

    /// Load several sessions in key order; missing ones are skipped.
    fn get_sessions(&self, keys: Vec<SessionKey>) -> BoxFuture<'_, Result<Vec<Session>>>;

    /// Replace an existing session.
    fn put_session(&self, session: Session) -> BoxFuture<'_, Result<()>>;

    /// Delete a session; returns whether it existed.
    fn delete_session(&self, key: SessionKey) -> BoxFuture<'_, Result<bool>>;

    /// Sessions of a conference, optionally restricted to one session type.
    fn sessions_for_conference(
        &self,
        conference: ConferenceKey,
        type_of_session: Option<String>,
    ) -> BoxFuture<'_, Result<Vec<Session>>>;

    /// Sessions given by `speaker`, across all conferences.
    fn sessions_by_speaker(&self, speaker: String) -> BoxFuture<'_, Result<Vec<Session>>>;

    /// Dated sessions with `start <= date <= end`, ordered by date.
    fn sessions_in_date_range(
        &self,
        conference: Option<ConferenceKey>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<Session>>>;

    // ── Transactions ──────────────────────────────────────────

    /// Run `txn` over the attendee's profile and the conference atomically.
    ///
    /// Both entities are locked (profile first) for the duration of the
    /// mutation. They are written back only if `txn` returns `Ok`.
    fn transact_registration(
        &self,
        user_id: UserId,
        conference: ConferenceKey,
        txn: RegistrationTxn,
    ) -> BoxFuture<'_, Result<bool>>;
}

/// Ephemeral string storage for announcement notices.
pub trait AnnouncementCache: Send + Sync {
    /// Read a value.
    fn get(&self, key: &'static str) -> BoxFuture<'_, Result<Option<String>>>;

    /// Write a value.
    fn set(&self, key: &'static str, value: String) -> BoxFuture<'_, Result<()>>;

    /// Remove a value.
    fn delete(&self, key: &'static str) -> BoxFuture<'_, Result<()>>;
}

/// Fire-and-forget background work.
pub trait TaskQueue: Send + Sync {
    /// Hand `task` off for asynchronous execution.
    fn enqueue(&self, task: Task) -> BoxFuture<'_, Result<()>>;
}
