//! Conference Central operations.
//!
//! [`ConferenceService`] is the imperative shell around the core. Each
//! operation resolves keys, enforces ownership, runs the mapper or a reducer
//! through the entity store, and hands notifications to the task queue.
//!
//! Callers arrive already authenticated; operations that accept anonymous
//! callers simply take no [`Caller`].
//!
//! ```text
//! handler ─▶ ConferenceService ─▶ mapper / filter / reducer
//!                   │                        │
//!                   ├──▶ EntityStore ◀───────┘ (transactions)
//!                   └──▶ TaskQueue (fire-and-forget)
//! ```

use chrono::NaiveDate;
use conference_core::announcement::{
    AnnouncementRefresher, FEATURED_SPEAKERS_KEY, RECENT_ANNOUNCEMENTS_KEY,
};
use conference_core::filter::compile;
use conference_core::forms::{
    BooleanMessage, ConferenceForm, ConferenceForms, ConferenceQueryForms, ProfileForm,
    ProfileMiniForm, SessionForm, SessionForms, StringMessage,
};
use conference_core::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, WishlistAction,
    WishlistReducer,
};
use conference_core::store::{AnnouncementCache, EntityStore, RegistrationTxn, TaskQueue};
use conference_core::tasks::Task;
use conference_core::{
    Caller, Conference, ConferenceError, ConferenceKey, Profile, Result, Session, SessionKey,
    UserId, mapper,
};
use conference_runtime::metrics::{
    CONFERENCES_CREATED, REGISTRATIONS, SESSIONS_CREATED, TRANSACTION_DURATION, WISHLIST_CHANGES,
};
use conference_runtime::{EffectExecutor, RetryPolicy, retry_transaction};
use futures::TryStreamExt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;

/// Conference Central operations over injected collaborators.
pub struct ConferenceService {
    store: Arc<dyn EntityStore>,
    tasks: Arc<dyn TaskQueue>,
    refresher: AnnouncementRefresher,
    registration_env: RegistrationEnvironment,
    effects: EffectExecutor<RegistrationAction>,
    retry: RetryPolicy,
}

impl ConferenceService {
    /// Create a service with the default retry policy.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        cache: Arc<dyn AnnouncementCache>,
        tasks: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            refresher: AnnouncementRefresher::new(Arc::clone(&store), cache),
            registration_env: RegistrationEnvironment::new(Arc::clone(&tasks)),
            store,
            tasks,
            effects: EffectExecutor::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy for conflicting transactions.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Executor running post-commit registration effects.
    #[must_use]
    pub const fn effects(&self) -> &EffectExecutor<RegistrationAction> {
        &self.effects
    }

    // ========================================================================
    // Profiles
    // ========================================================================

    /// The caller's profile, created on first access.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_profile(&self, caller: &Caller) -> Result<ProfileForm> {
        let profile = self.load_or_create_profile(caller).await?;
        Ok(mapper::profile_to_form(&profile))
    }

    /// Update the caller's display name and t-shirt size.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn save_profile(&self, caller: &Caller, form: ProfileMiniForm) -> Result<ProfileForm> {
        self.load_or_create_profile(caller).await?;

        let changed = retry_transaction(&self.retry, "save_profile", || {
            let form = form.clone();
            self.store.transact_profile(
                caller.user_id.clone(),
                Box::new(move |profile| Ok(mapper::apply_profile_update(profile, &form))),
            )
        })
        .await?;
        tracing::debug!(user_id = %caller.user_id, changed, "Saved profile");

        let profile = self.require_profile(&caller.user_id).await?;
        Ok(mapper::profile_to_form(&profile))
    }

    async fn load_or_create_profile(&self, caller: &Caller) -> Result<Profile> {
        if let Some(profile) = self.store.get_profile(caller.user_id.clone()).await? {
            return Ok(profile);
        }

        let profile = mapper::new_profile(caller);
        self.store.put_profile(profile.clone()).await?;
        tracing::info!(user_id = %caller.user_id, "Created profile on first access");
        Ok(profile)
    }

    async fn require_profile(&self, user_id: &UserId) -> Result<Profile> {
        self.store
            .get_profile(user_id.clone())
            .await?
            .ok_or_else(|| ConferenceError::not_found("profile", user_id.as_str()))
    }

    // ========================================================================
    // Conferences
    // ========================================================================

    /// Create a conference organized by the caller.
    ///
    /// A confirmation email is queued for the organizer; failing to queue it
    /// does not fail the request.
    ///
    /// # Errors
    ///
    /// `BadRequest` for a missing name or an unparsable date; store failures.
    pub async fn create_conference(
        &self,
        caller: &Caller,
        mut form: ConferenceForm,
    ) -> Result<ConferenceForm> {
        let profile = self.load_or_create_profile(caller).await?;
        let new_conference = mapper::new_conference(&mut form, caller)?;
        let conference = self.store.insert_conference(new_conference).await?;

        metrics::counter!(CONFERENCES_CREATED).increment(1);
        tracing::info!(
            conference = %conference.key,
            name = %conference.name,
            organizer = %caller.user_id,
            "Conference created"
        );

        let rendered = mapper::conference_to_form(&conference, Some(&profile.display_name));
        self.dispatch(Task::SendConfirmationEmail {
            email: caller.email.clone(),
            conference_info: conference_info(&rendered),
        })
        .await;
        Ok(rendered)
    }

    /// Update a conference owned by the caller.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key, `Forbidden` for a non-owner,
    /// `BadRequest` for invalid fields.
    pub async fn update_conference(
        &self,
        caller: &Caller,
        websafe_conference_key: &str,
        form: ConferenceForm,
    ) -> Result<ConferenceForm> {
        let key = ConferenceKey::from_websafe(websafe_conference_key)?;
        let existing = self.require_conference(&key).await?;
        ensure_owner(
            existing.organizer_user_id(),
            caller,
            "Only the owner can update the conference.",
        )?;

        let conference = retry_transaction(&self.retry, "update_conference", || {
            let form = form.clone();
            self.store.update_conference(
                key.clone(),
                Box::new(move |conference| mapper::apply_conference_update(conference, &form)),
            )
        })
        .await?;
        tracing::info!(conference = %conference.key, "Conference updated");

        let display_name = self.display_name(conference.organizer_user_id()).await?;
        Ok(mapper::conference_to_form(&conference, display_name.as_deref()))
    }

    /// Look up a conference by its web-safe key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not name a stored conference.
    pub async fn get_conference(&self, websafe_conference_key: &str) -> Result<ConferenceForm> {
        let key = ConferenceKey::from_websafe(websafe_conference_key)?;
        let conference = self.require_conference(&key).await?;
        let display_name = self.display_name(conference.organizer_user_id()).await?;
        Ok(mapper::conference_to_form(&conference, display_name.as_deref()))
    }

    /// Conferences organized by the caller.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_conferences_created(&self, caller: &Caller) -> Result<ConferenceForms> {
        let conferences = self
            .store
            .conferences_by_organizer(caller.user_id.clone())
            .await?;
        self.render_conferences(conferences).await
    }

    /// Conferences matching every filter clause, in query order.
    ///
    /// # Errors
    ///
    /// `InvalidFilter` or `BadRequest` from the filter compiler, before the
    /// store is touched.
    pub async fn query_conferences(&self, query: ConferenceQueryForms) -> Result<ConferenceForms> {
        let query = compile(&query.filters)?;
        let conferences: Vec<Conference> = self.store.query_conferences(query).try_collect().await?;
        self.render_conferences(conferences).await
    }

    async fn require_conference(&self, key: &ConferenceKey) -> Result<Conference> {
        self.store
            .get_conference(key.clone())
            .await?
            .ok_or_else(|| ConferenceError::not_found("conference", key.to_websafe()))
    }

    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>> {
        Ok(self
            .store
            .get_profile(user_id.clone())
            .await?
            .map(|profile| profile.display_name))
    }

    /// Render conferences with their organizers' display names, looked up in
    /// one batch.
    async fn render_conferences(&self, conferences: Vec<Conference>) -> Result<ConferenceForms> {
        let organizers: BTreeSet<UserId> = conferences
            .iter()
            .map(|c| c.organizer_user_id().clone())
            .collect();
        let names: HashMap<UserId, String> = self
            .store
            .get_profiles(organizers.into_iter().collect())
            .await?
            .into_iter()
            .map(|profile| (profile.user_id, profile.display_name))
            .collect();

        Ok(ConferenceForms {
            items: conferences
                .iter()
                .map(|c| {
                    let name = names.get(c.organizer_user_id()).map(String::as_str);
                    mapper::conference_to_form(c, name)
                })
                .collect(),
        })
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Register the caller for a conference, taking one seat.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key; `Conflict` when already registered or
    /// sold out; `TransactionConflict` once retries are exhausted.
    pub async fn register_for_conference(
        &self,
        caller: &Caller,
        websafe_conference_key: &str,
    ) -> Result<BooleanMessage> {
        self.change_registration(caller, websafe_conference_key, RegistrationAction::Register)
            .await
    }

    /// Unregister the caller from a conference, returning the seat.
    ///
    /// `false` when the caller was not registered.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key; `TransactionConflict` once retries are
    /// exhausted.
    pub async fn unregister_from_conference(
        &self,
        caller: &Caller,
        websafe_conference_key: &str,
    ) -> Result<BooleanMessage> {
        self.change_registration(caller, websafe_conference_key, RegistrationAction::Unregister)
            .await
    }

    /// Conferences the caller is registered for.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_conferences_to_attend(&self, caller: &Caller) -> Result<ConferenceForms> {
        let profile = self.load_or_create_profile(caller).await?;
        let conferences = self
            .store
            .get_conferences(profile.conference_keys_to_attend)
            .await?;
        self.render_conferences(conferences).await
    }

    /// Run one registration transition inside a store transaction.
    ///
    /// The reducer's effects are handed out of the transaction through a
    /// oneshot channel and only executed once the store has committed.
    async fn change_registration(
        &self,
        caller: &Caller,
        websafe_conference_key: &str,
        action: RegistrationAction,
    ) -> Result<BooleanMessage> {
        let key = ConferenceKey::from_websafe(websafe_conference_key)?;
        self.load_or_create_profile(caller).await?;

        let operation = match action {
            RegistrationAction::Register => "register",
            RegistrationAction::Unregister => "unregister",
        };

        let started = Instant::now();
        let result = retry_transaction(&self.retry, operation, || {
            let (sender, receiver) = oneshot::channel();
            let env = self.registration_env.clone();
            let txn: RegistrationTxn = Box::new(move |state| {
                let (outcome, effects) = RegistrationReducer.transition(state, action, &env);
                let _ = sender.send(effects);
                outcome
            });
            let transaction =
                self.store
                    .transact_registration(caller.user_id.clone(), key.clone(), txn);

            async move {
                let changed = transaction.await?;
                Ok::<_, ConferenceError>((changed, receiver.await.unwrap_or_default()))
            }
        })
        .await;
        metrics::histogram!(TRANSACTION_DURATION, "operation" => operation)
            .record(started.elapsed().as_secs_f64());
        metrics::counter!(
            REGISTRATIONS,
            "action" => operation,
            "outcome" => outcome_label(result.as_ref().map(|(changed, _)| *changed))
        )
        .increment(1);

        let (changed, effects) = result.inspect_err(|error| {
            tracing::debug!(
                conference = %key,
                user_id = %caller.user_id,
                error = %error,
                "Registration change refused"
            );
        })?;
        self.effects.execute_all(effects);

        tracing::info!(
            conference = %key,
            user_id = %caller.user_id,
            operation,
            changed,
            "Registration changed"
        );
        Ok(BooleanMessage { data: changed })
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Create a session under a conference owned by the caller.
    ///
    /// A featured-speaker recompute for the session's speaker is queued.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown conference, `Forbidden` for a non-owner,
    /// `BadRequest` for a missing name or unparsable date/time.
    pub async fn create_session(
        &self,
        caller: &Caller,
        websafe_conference_key: &str,
        mut form: SessionForm,
    ) -> Result<SessionForm> {
        let key = ConferenceKey::from_websafe(websafe_conference_key)?;
        let conference = self.require_conference(&key).await?;
        ensure_owner(
            conference.organizer_user_id(),
            caller,
            "Only the owner can add sessions to the conference.",
        )?;

        let new_session = mapper::new_session(&mut form, &conference)?;
        let session = self.store.insert_session(new_session).await?;

        metrics::counter!(SESSIONS_CREATED).increment(1);
        tracing::info!(
            session = %session.key,
            conference = %conference.key,
            speaker = %session.speaker,
            "Session created"
        );

        self.dispatch(Task::SetFeaturedSpeaker {
            speaker: session.speaker.clone(),
        })
        .await;
        Ok(mapper::session_to_form(&session))
    }

    /// Update a session whose conference the caller owns.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key, `Forbidden` for a non-owner,
    /// `BadRequest` for an unparsable date/time.
    pub async fn update_session(
        &self,
        caller: &Caller,
        websafe_session_key: &str,
        form: SessionForm,
    ) -> Result<SessionForm> {
        let key = SessionKey::from_websafe(websafe_session_key)?;
        let mut session = self.require_session(&key).await?;
        ensure_owner(
            session.organizer_user_id(),
            caller,
            "Only the owner can update the session.",
        )?;

        let previous_speaker = session.speaker.clone();
        mapper::apply_session_update(&mut session, &form)?;
        self.store.put_session(session.clone()).await?;
        tracing::info!(session = %session.key, "Session updated");

        if session.speaker != previous_speaker {
            self.dispatch(Task::SetFeaturedSpeaker {
                speaker: session.speaker.clone(),
            })
            .await;
        }
        Ok(mapper::session_to_form(&session))
    }

    /// Delete a session whose conference the caller owns and recompute the
    /// featured speaker for its speaker.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown key, `Forbidden` for a non-owner.
    pub async fn delete_session(
        &self,
        caller: &Caller,
        websafe_session_key: &str,
    ) -> Result<BooleanMessage> {
        let key = SessionKey::from_websafe(websafe_session_key)?;
        let session = self.require_session(&key).await?;
        ensure_owner(
            session.organizer_user_id(),
            caller,
            "Only the owner can delete the session.",
        )?;

        let deleted = self.store.delete_session(key).await?;
        tracing::info!(session = %session.key, deleted, "Session deleted");

        if deleted {
            self.dispatch(Task::SetFeaturedSpeaker {
                speaker: session.speaker,
            })
            .await;
        }
        Ok(BooleanMessage { data: deleted })
    }

    /// Look up a session by its web-safe key.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key does not name a stored session.
    pub async fn get_session(&self, websafe_session_key: &str) -> Result<SessionForm> {
        let key = SessionKey::from_websafe(websafe_session_key)?;
        let session = self.require_session(&key).await?;
        Ok(mapper::session_to_form(&session))
    }

    /// Every session of a conference.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown conference.
    pub async fn get_conference_sessions(&self, websafe_conference_key: &str) -> Result<SessionForms> {
        self.conference_sessions(websafe_conference_key, None).await
    }

    /// Sessions of a conference with the given session type.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown conference.
    pub async fn get_conference_sessions_by_type(
        &self,
        websafe_conference_key: &str,
        type_of_session: &str,
    ) -> Result<SessionForms> {
        self.conference_sessions(websafe_conference_key, Some(type_of_session.to_string()))
            .await
    }

    /// Sessions given by a speaker, across all conferences.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn get_sessions_by_speaker(&self, speaker: &str) -> Result<SessionForms> {
        let sessions = self.store.sessions_by_speaker(speaker.to_string()).await?;
        Ok(render_sessions(&sessions))
    }

    /// Dated sessions within `[start_date, end_date]`, optionally restricted
    /// to one conference, ordered by date.
    ///
    /// Missing bounds default to the earliest and latest representable dates.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown conference, `BadRequest` for an unparsable
    /// date.
    pub async fn get_sessions_in_date_range(
        &self,
        websafe_conference_key: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<SessionForms> {
        let conference = match websafe_conference_key.filter(|token| !token.is_empty()) {
            Some(token) => {
                let key = ConferenceKey::from_websafe(token)?;
                self.require_conference(&key).await?;
                Some(key)
            },
            None => None,
        };
        let start = parse_bound("startDate", start_date)?.unwrap_or_else(earliest_date);
        let end = parse_bound("endDate", end_date)?.unwrap_or_else(latest_date);

        let sessions = self
            .store
            .sessions_in_date_range(conference, start, end)
            .await?;
        Ok(render_sessions(&sessions))
    }

    async fn conference_sessions(
        &self,
        websafe_conference_key: &str,
        type_of_session: Option<String>,
    ) -> Result<SessionForms> {
        let key = ConferenceKey::from_websafe(websafe_conference_key)?;
        self.require_conference(&key).await?;
        let sessions = self
            .store
            .sessions_for_conference(key, type_of_session)
            .await?;
        Ok(render_sessions(&sessions))
    }

    async fn require_session(&self, key: &SessionKey) -> Result<Session> {
        self.store
            .get_session(key.clone())
            .await?
            .ok_or_else(|| ConferenceError::not_found("session", key.to_websafe()))
    }

    // ========================================================================
    // Wishlist
    // ========================================================================

    /// Add a session to the caller's wishlist.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown session; `Conflict` when already wishlisted.
    pub async fn add_session_to_wishlist(
        &self,
        caller: &Caller,
        websafe_session_key: &str,
    ) -> Result<BooleanMessage> {
        let key = SessionKey::from_websafe(websafe_session_key)?;
        self.require_session(&key).await?;
        self.change_wishlist(caller, WishlistAction::Add(key), "add").await
    }

    /// Remove a session from the caller's wishlist.
    ///
    /// The session itself need not exist any more; `false` when it was not
    /// on the wishlist.
    ///
    /// # Errors
    ///
    /// `NotFound` for a token that is not a session key.
    pub async fn delete_session_in_wishlist(
        &self,
        caller: &Caller,
        websafe_session_key: &str,
    ) -> Result<BooleanMessage> {
        let key = SessionKey::from_websafe(websafe_session_key)?;
        self.change_wishlist(caller, WishlistAction::Remove(key), "remove").await
    }

    /// Sessions on the caller's wishlist, optionally restricted to one
    /// conference. Entries whose session was deleted are skipped.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown conference.
    pub async fn get_sessions_in_wishlist(
        &self,
        caller: &Caller,
        websafe_conference_key: Option<&str>,
    ) -> Result<SessionForms> {
        let profile = self.load_or_create_profile(caller).await?;

        let keys: Vec<SessionKey> = match websafe_conference_key.filter(|token| !token.is_empty()) {
            Some(token) => {
                let conference = ConferenceKey::from_websafe(token)?;
                self.require_conference(&conference).await?;
                profile
                    .session_keys_wishlist
                    .iter()
                    .filter(|key| key.conference == conference)
                    .cloned()
                    .collect()
            },
            None => profile.session_keys_wishlist,
        };

        let sessions = self.store.get_sessions(keys).await?;
        Ok(render_sessions(&sessions))
    }

    async fn change_wishlist(
        &self,
        caller: &Caller,
        action: WishlistAction,
        operation: &'static str,
    ) -> Result<BooleanMessage> {
        self.load_or_create_profile(caller).await?;

        let result = retry_transaction(&self.retry, "wishlist", || {
            let action = action.clone();
            self.store.transact_profile(
                caller.user_id.clone(),
                Box::new(move |profile| WishlistReducer.apply(profile, action)),
            )
        })
        .await;
        metrics::counter!(
            WISHLIST_CHANGES,
            "action" => operation,
            "outcome" => outcome_label(result.as_ref().copied())
        )
        .increment(1);

        let changed = result?;
        tracing::debug!(user_id = %caller.user_id, operation, changed, "Wishlist changed");
        Ok(BooleanMessage { data: changed })
    }

    // ========================================================================
    // Announcements
    // ========================================================================

    /// The near-sold-out notice, `""` when there is none.
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub async fn get_announcement(&self) -> Result<StringMessage> {
        Ok(StringMessage {
            data: self.refresher.read(RECENT_ANNOUNCEMENTS_KEY).await?,
        })
    }

    /// The featured-speaker notice, `""` when there is none.
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub async fn get_featured_speaker(&self) -> Result<StringMessage> {
        Ok(StringMessage {
            data: self.refresher.read(FEATURED_SPEAKERS_KEY).await?,
        })
    }

    async fn dispatch(&self, task: Task) {
        let name = task.name();
        if let Err(error) = self.tasks.enqueue(task).await {
            tracing::warn!(task = name, error = %error, "Failed to enqueue background task");
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn ensure_owner(owner: &UserId, caller: &Caller, message: &str) -> Result<()> {
    if *owner == caller.user_id {
        Ok(())
    } else {
        Err(ConferenceError::Forbidden(message.to_string()))
    }
}

fn render_sessions(sessions: &[Session]) -> SessionForms {
    SessionForms {
        items: sessions.iter().map(mapper::session_to_form).collect(),
    }
}

fn conference_info(form: &ConferenceForm) -> String {
    serde_json::to_string_pretty(form).unwrap_or_else(|_| form.name.clone().unwrap_or_default())
}

fn parse_bound(field: &str, raw: Option<&str>) -> Result<Option<NaiveDate>> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| mapper::parse_date(field, s))
        .transpose()
}

fn earliest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

fn latest_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn outcome_label(result: std::result::Result<bool, &ConferenceError>) -> &'static str {
    match result {
        Ok(true) => "changed",
        Ok(false) => "unchanged",
        Err(ConferenceError::Conflict(_)) => "refused",
        Err(_) => "failed",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn missing_bounds_cover_every_calendar_date() {
        assert!(earliest_date() <= NaiveDate::from_ymd_opt(1900, 1, 1).unwrap());
        assert!(latest_date() >= NaiveDate::from_ymd_opt(2999, 12, 31).unwrap());
        assert_eq!(parse_bound("startDate", Some("  ")).unwrap(), None);
        assert_eq!(
            parse_bound("startDate", Some("2026-06-01")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 1)
        );
        assert!(matches!(
            parse_bound("startDate", Some("June")),
            Err(ConferenceError::BadRequest(_))
        ));
    }

    #[test]
    fn outcomes_are_labelled() {
        let refused = ConferenceError::Conflict(conference_core::ConflictReason::SeatsExhausted);
        let failed = ConferenceError::Storage("down".into());

        assert_eq!(outcome_label(Ok(true)), "changed");
        assert_eq!(outcome_label(Ok(false)), "unchanged");
        assert_eq!(outcome_label(Err(&refused)), "refused");
        assert_eq!(outcome_label(Err(&failed)), "failed");
    }

    #[test]
    fn ownership_is_by_user_id() {
        let caller = conference_testing::fixtures::caller("ann");
        assert!(ensure_owner(&UserId::new("ann"), &caller, "no").is_ok());
        assert_eq!(
            ensure_owner(&UserId::new("bob"), &caller, "no"),
            Err(ConferenceError::Forbidden("no".into()))
        );
    }
}
