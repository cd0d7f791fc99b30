//! In-memory implementations of the collaborator traits.
//!
//! - [`InMemoryEntityStore`]: `HashMap`/`BTreeMap` entity storage; one lock
//!   serializes every operation, which makes the transactions trivially atomic
//! - [`InMemoryAnnouncementCache`]: `HashMap` cache
//! - [`RecordingTaskQueue`]: records tasks instead of running them
//! - [`StaticIdentityProvider`]: fixed token → caller table
//! - [`RecordingEmailProvider`]: records sent mail
//! - [`FixedClock`]: deterministic time

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on poisoned locks

use chrono::{DateTime, NaiveDate, Utc};
use conference_core::environment::Clock;
use conference_core::filter::ConferenceQuery;
use conference_core::providers::{EmailProvider, IdentityProvider};
use conference_core::registration::RegistrationState;
use conference_core::store::{
    AnnouncementCache, BoxFuture, ConferenceStream, ConferenceTxn, EntityStore, ProfileTxn,
    RegistrationTxn, TaskQueue,
};
use conference_core::tasks::Task;
use conference_core::{
    Caller, Conference, ConferenceError, ConferenceId, ConferenceKey, NewConference, NewSession, Profile,
    Result, Session, SessionId, SessionKey, UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// ============================================================================
// Entity store
// ============================================================================

#[derive(Debug, Default)]
struct Tables {
    profiles: HashMap<UserId, Profile>,
    conferences: BTreeMap<ConferenceId, Conference>,
    sessions: BTreeMap<SessionId, Session>,
    next_conference_id: i64,
    next_session_id: i64,
}

impl Tables {
    fn conference(&self, key: &ConferenceKey) -> Option<&Conference> {
        self.conferences.get(&key.id).filter(|c| c.key == *key)
    }

    fn session(&self, key: &SessionKey) -> Option<&Session> {
        self.sessions.get(&key.id).filter(|s| s.key == *key)
    }
}

/// In-memory entity store for fast, deterministic tests.
///
/// # Example
///
/// ```
/// use conference_testing::InMemoryEntityStore;
/// use conference_core::store::EntityStore;
/// use conference_core::UserId;
///
/// # async fn example() -> conference_core::Result<()> {
/// let store = InMemoryEntityStore::new();
/// assert!(store.get_profile(UserId::new("nobody")).await?.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryEntityStore {
    tables: Arc<Mutex<Tables>>,
    injected_conflicts: Arc<AtomicUsize>,
}

impl InMemoryEntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` registration transactions fail with
    /// `TransactionConflict`, as if they had lost a lock race.
    pub fn inject_transaction_conflicts(&self, count: usize) {
        self.injected_conflicts.store(count, Ordering::SeqCst);
    }

    /// Number of stored conferences.
    #[must_use]
    pub fn conference_count(&self) -> usize {
        self.tables.lock().unwrap().conferences.len()
    }

    /// Number of stored sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    /// Snapshot of a conference, bypassing the async API.
    #[must_use]
    pub fn conference_snapshot(&self, key: &ConferenceKey) -> Option<Conference> {
        self.tables.lock().unwrap().conference(key).cloned()
    }

    /// Snapshot of a profile, bypassing the async API.
    #[must_use]
    pub fn profile_snapshot(&self, user_id: &UserId) -> Option<Profile> {
        self.tables.lock().unwrap().profiles.get(user_id).cloned()
    }

    fn take_injected_conflict(&self) -> bool {
        self.injected_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn get_profile(&self, user_id: UserId) -> BoxFuture<'_, Result<Option<Profile>>> {
        Box::pin(async move { Ok(self.tables.lock().unwrap().profiles.get(&user_id).cloned()) })
    }

    fn get_profiles(&self, user_ids: Vec<UserId>) -> BoxFuture<'_, Result<Vec<Profile>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            Ok(user_ids
                .iter()
                .filter_map(|id| tables.profiles.get(id).cloned())
                .collect())
        })
    }

    fn put_profile(&self, profile: Profile) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.tables
                .lock()
                .unwrap()
                .profiles
                .insert(profile.user_id.clone(), profile);
            Ok(())
        })
    }

    fn transact_profile(&self, user_id: UserId, txn: ProfileTxn) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            let mut profile = tables
                .profiles
                .get(&user_id)
                .cloned()
                .ok_or_else(|| ConferenceError::not_found("profile", user_id.as_str()))?;

            let changed = txn(&mut profile)?;
            tables.profiles.insert(user_id, profile);
            Ok(changed)
        })
    }

    fn insert_conference(&self, conference: NewConference) -> BoxFuture<'_, Result<Conference>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            tables.next_conference_id += 1;
            let id = ConferenceId::new(tables.next_conference_id);
            let conference = conference.into_conference(id);
            tables.conferences.insert(id, conference.clone());
            Ok(conference)
        })
    }

    fn get_conference(&self, key: ConferenceKey) -> BoxFuture<'_, Result<Option<Conference>>> {
        Box::pin(async move { Ok(self.tables.lock().unwrap().conference(&key).cloned()) })
    }

    fn get_conferences(&self, keys: Vec<ConferenceKey>) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            Ok(keys
                .iter()
                .filter_map(|key| tables.conference(key).cloned())
                .collect())
        })
    }

    fn update_conference(
        &self,
        key: ConferenceKey,
        txn: ConferenceTxn,
    ) -> BoxFuture<'_, Result<Conference>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            let mut conference = tables
                .conference(&key)
                .cloned()
                .ok_or_else(|| ConferenceError::not_found("conference", key.to_websafe()))?;

            txn(&mut conference)?;
            tables.conferences.insert(key.id, conference.clone());
            Ok(conference)
        })
    }

    fn conferences_by_organizer(&self, organizer: UserId) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            let mut conferences: Vec<Conference> = tables
                .conferences
                .values()
                .filter(|c| *c.organizer_user_id() == organizer)
                .cloned()
                .collect();
            conferences.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(conferences)
        })
    }

    fn query_conferences(&self, query: ConferenceQuery) -> ConferenceStream<'_> {
        let mut matches: Vec<Conference> = self
            .tables
            .lock()
            .unwrap()
            .conferences
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        matches.sort_by(|a, b| query.compare(a, b));
        Box::pin(futures::stream::iter(matches.into_iter().map(Ok)))
    }

    fn conferences_with_seats_between(
        &self,
        min: i32,
        max: i32,
    ) -> BoxFuture<'_, Result<Vec<Conference>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            let mut conferences: Vec<Conference> = tables
                .conferences
                .values()
                .filter(|c| (min..=max).contains(&c.seats_available))
                .cloned()
                .collect();
            conferences.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(conferences)
        })
    }

    fn insert_session(&self, session: NewSession) -> BoxFuture<'_, Result<Session>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            if tables.conference(&session.conference).is_none() {
                return Err(ConferenceError::not_found(
                    "conference",
                    session.conference.to_websafe(),
                ));
            }
            tables.next_session_id += 1;
            let id = SessionId::new(tables.next_session_id);
            let session = session.into_session(id);
            tables.sessions.insert(id, session.clone());
            Ok(session)
        })
    }

    fn get_session(&self, key: SessionKey) -> BoxFuture<'_, Result<Option<Session>>> {
        Box::pin(async move { Ok(self.tables.lock().unwrap().session(&key).cloned()) })
    }

    fn get_sessions(&self, keys: Vec<SessionKey>) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            Ok(keys
                .iter()
                .filter_map(|key| tables.session(key).cloned())
                .collect())
        })
    }

    fn put_session(&self, session: Session) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            if tables.session(&session.key).is_none() {
                return Err(ConferenceError::not_found("session", session.key.to_websafe()));
            }
            tables.sessions.insert(session.key.id, session);
            Ok(())
        })
    }

    fn delete_session(&self, key: SessionKey) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            let mut tables = self.tables.lock().unwrap();
            if tables.session(&key).is_none() {
                return Ok(false);
            }
            Ok(tables.sessions.remove(&key.id).is_some())
        })
    }

    fn sessions_for_conference(
        &self,
        conference: ConferenceKey,
        type_of_session: Option<String>,
    ) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            Ok(tables
                .sessions
                .values()
                .filter(|s| s.key.conference == conference)
                .filter(|s| {
                    type_of_session
                        .as_ref()
                        .is_none_or(|t| s.type_of_session.contains(t))
                })
                .cloned()
                .collect())
        })
    }

    fn sessions_by_speaker(&self, speaker: String) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            Ok(tables
                .sessions
                .values()
                .filter(|s| s.speaker == speaker)
                .cloned()
                .collect())
        })
    }

    fn sessions_in_date_range(
        &self,
        conference: Option<ConferenceKey>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> BoxFuture<'_, Result<Vec<Session>>> {
        Box::pin(async move {
            let tables = self.tables.lock().unwrap();
            let mut sessions: Vec<Session> = tables
                .sessions
                .values()
                .filter(|s| conference.as_ref().is_none_or(|c| s.key.conference == *c))
                .filter(|s| s.date.is_some_and(|d| d >= start && d <= end))
                .cloned()
                .collect();
            sessions.sort_by_key(|s| (s.date, s.key.id));
            Ok(sessions)
        })
    }

    fn transact_registration(
        &self,
        user_id: UserId,
        conference: ConferenceKey,
        txn: RegistrationTxn,
    ) -> BoxFuture<'_, Result<bool>> {
        Box::pin(async move {
            if self.take_injected_conflict() {
                return Err(ConferenceError::TransactionConflict(
                    "injected lock conflict".to_string(),
                ));
            }

            let mut tables = self.tables.lock().unwrap();
            let profile = tables
                .profiles
                .get(&user_id)
                .cloned()
                .ok_or_else(|| ConferenceError::not_found("profile", user_id.as_str()))?;
            let stored = tables
                .conference(&conference)
                .cloned()
                .ok_or_else(|| ConferenceError::not_found("conference", conference.to_websafe()))?;

            let mut state = RegistrationState::new(profile, stored);
            let changed = txn(&mut state)?;

            tables.profiles.insert(user_id, state.profile);
            tables.conferences.insert(conference.id, state.conference);
            Ok(changed)
        })
    }
}

// ============================================================================
// Announcement cache
// ============================================================================

/// In-memory announcement cache.
#[derive(Clone, Debug, Default)]
pub struct InMemoryAnnouncementCache {
    entries: Arc<RwLock<HashMap<&'static str, String>>>,
}

impl InMemoryAnnouncementCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `key`, bypassing the async API.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }
}

impl AnnouncementCache for InMemoryAnnouncementCache {
    fn get(&self, key: &'static str) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move { Ok(self.entries.read().unwrap().get(key).cloned()) })
    }

    fn set(&self, key: &'static str, value: String) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.entries.write().unwrap().insert(key, value);
            Ok(())
        })
    }

    fn delete(&self, key: &'static str) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.entries.write().unwrap().remove(key);
            Ok(())
        })
    }
}

// ============================================================================
// Task queue
// ============================================================================

/// Task queue that records what was enqueued.
#[derive(Clone, Debug, Default)]
pub struct RecordingTaskQueue {
    tasks: Arc<Mutex<Vec<Task>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingTaskQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `enqueue` fail.
    pub fn fail_enqueues(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Tasks enqueued so far.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.lock().unwrap().clone()
    }

    /// Drain the recorded tasks.
    pub fn take(&self) -> Vec<Task> {
        std::mem::take(&mut *self.tasks.lock().unwrap())
    }
}

impl TaskQueue for RecordingTaskQueue {
    fn enqueue(&self, task: Task) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.failing.load(Ordering::SeqCst) {
                return Err(ConferenceError::Queue("queue unavailable".to_string()));
            }
            self.tasks.lock().unwrap().push(task);
            Ok(())
        })
    }
}

// ============================================================================
// Identity and email
// ============================================================================

/// Identity provider backed by a fixed token table.
#[derive(Clone, Debug, Default)]
pub struct StaticIdentityProvider {
    callers: Arc<RwLock<HashMap<String, Caller>>>,
}

impl StaticIdentityProvider {
    /// Create a provider that knows no tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `caller`.
    #[must_use]
    pub fn with_token(self, token: impl Into<String>, caller: Caller) -> Self {
        self.callers.write().unwrap().insert(token.into(), caller);
        self
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn resolve(&self, token: &str) -> BoxFuture<'_, Result<Option<Caller>>> {
        let caller = self.callers.read().unwrap().get(token).cloned();
        Box::pin(async move { Ok(caller) })
    }
}

/// A confirmation email captured by [`RecordingEmailProvider`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient
    pub to: String,
    /// Conference dump
    pub conference_info: String,
}

/// Email provider that records instead of sending.
#[derive(Clone, Debug, Default)]
pub struct RecordingEmailProvider {
    sent: Arc<Mutex<Vec<SentEmail>>>,
}

impl RecordingEmailProvider {
    /// Create an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl EmailProvider for RecordingEmailProvider {
    fn send_conference_confirmation(
        &self,
        to: &str,
        conference_info: &str,
    ) -> BoxFuture<'_, Result<()>> {
        let email = SentEmail {
            to: to.to_string(),
            conference_info: conference_info.to_string(),
        };
        Box::pin(async move {
            self.sent.lock().unwrap().push(email);
            Ok(())
        })
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Fixed clock for deterministic tests
///
/// Always returns the same time, making tests reproducible.
///
/// # Example
///
/// ```
/// use conference_testing::mocks::FixedClock;
/// use conference_core::environment::Clock;
/// use chrono::Utc;
///
/// let clock = FixedClock::new(Utc::now());
/// assert_eq!(clock.now(), clock.now());
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given time
    #[must_use]
    pub const fn new(time: DateTime<Utc>) -> Self {
        Self { time }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.time
    }
}

/// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
///
/// # Panics
///
/// This function will panic if the hardcoded timestamp fails to parse,
/// which should never happen in practice.
#[must_use]
#[allow(clippy::expect_used)]
pub fn test_clock() -> FixedClock {
    FixedClock::new(
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .expect("hardcoded timestamp should always parse")
            .with_timezone(&Utc),
    )
}
