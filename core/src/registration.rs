//! Registration workflow: seat accounting and wishlist membership.
//!
//! Both workflows are reducers. They are pure over their state and are run
//! by the entity store inside a transaction (see
//! [`crate::store::EntityStore::transact_registration`] and
//! [`crate::store::EntityStore::transact_profile`]), so a refused transition
//! never reaches storage.
//!
//! ## Conference registration
//!
//! ```text
//!                 Register (seats > 0)
//! NotRegistered ───────────────────────▶ Registered
//!       ▲                                    │
//!       └──────────── Unregister ────────────┘
//! ```
//!
//! `Register` on a registered attendee is `AlreadyRegistered`; on a full
//! conference it is `SeatsExhausted`. `Unregister` on a non-registered
//! attendee is a `false` outcome, not an error.

use crate::announcement::is_nearly_sold_out;
use crate::effect::Effect;
use crate::error::{ConferenceError, ConflictReason, Result};
use crate::key::SessionKey;
use crate::reducer::Reducer;
use crate::store::TaskQueue;
use crate::tasks::Task;
use crate::types::{Conference, Profile};
use smallvec::{SmallVec, smallvec};
use std::sync::Arc;

// ============================================================================
// Conference registration
// ============================================================================

/// The two entities a registration touches, plus the transition outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationState {
    /// Attendee profile
    pub profile: Profile,
    /// Target conference
    pub conference: Conference,
    /// Set by the reducer: `Ok(changed)` or the refusal
    pub outcome: Option<Result<bool>>,
}

impl RegistrationState {
    /// Fresh state for one transition.
    #[must_use]
    pub const fn new(profile: Profile, conference: Conference) -> Self {
        Self {
            profile,
            conference,
            outcome: None,
        }
    }
}

/// Registration commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationAction {
    /// Take a seat
    Register,
    /// Give a seat back
    Unregister,
}

/// Dependencies of the registration reducer.
#[derive(Clone)]
pub struct RegistrationEnvironment {
    /// Where announcement refreshes are sent
    pub tasks: Arc<dyn TaskQueue>,
}

impl RegistrationEnvironment {
    /// Create an environment.
    #[must_use]
    pub fn new(tasks: Arc<dyn TaskQueue>) -> Self {
        Self { tasks }
    }
}

/// Seat-accounting reducer.
#[derive(Clone, Copy, Debug, Default)]
pub struct RegistrationReducer;

impl RegistrationReducer {
    /// Reduce one action and take its outcome.
    ///
    /// Effects are only produced for successful transitions.
    pub fn transition(
        &self,
        state: &mut RegistrationState,
        action: RegistrationAction,
        env: &RegistrationEnvironment,
    ) -> (Result<bool>, SmallVec<[Effect<RegistrationAction>; 4]>) {
        let effects = self.reduce(state, action, env);
        let outcome = state.outcome.take().unwrap_or(Ok(false));
        (outcome, effects)
    }

    fn refresh_if_window_touched(
        seats_before: i32,
        seats_after: i32,
        env: &RegistrationEnvironment,
    ) -> SmallVec<[Effect<RegistrationAction>; 4]> {
        if !is_nearly_sold_out(seats_before) && !is_nearly_sold_out(seats_after) {
            return SmallVec::new();
        }

        let tasks = Arc::clone(&env.tasks);
        smallvec![Effect::Future(Box::pin(async move {
            if let Err(error) = tasks.enqueue(Task::RefreshAnnouncement).await {
                tracing::warn!(error = %error, "Failed to enqueue announcement refresh");
            }
            None
        }))]
    }
}

impl Reducer for RegistrationReducer {
    type State = RegistrationState;
    type Action = RegistrationAction;
    type Environment = RegistrationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let key = state.conference.key.clone();
        let seats_before = state.conference.seats_available;

        match action {
            RegistrationAction::Register => {
                if state.profile.is_attending(&key) {
                    state.outcome = Some(Err(ConferenceError::Conflict(
                        ConflictReason::AlreadyRegistered,
                    )));
                    return SmallVec::new();
                }
                if seats_before <= 0 {
                    state.outcome = Some(Err(ConferenceError::Conflict(ConflictReason::SeatsExhausted)));
                    return SmallVec::new();
                }

                state.profile.conference_keys_to_attend.push(key);
                state.conference.seats_available -= 1;
                state.outcome = Some(Ok(true));
            },
            RegistrationAction::Unregister => {
                let before = state.profile.conference_keys_to_attend.len();
                state.profile.conference_keys_to_attend.retain(|k| *k != key);
                if state.profile.conference_keys_to_attend.len() == before {
                    state.outcome = Some(Ok(false));
                    return SmallVec::new();
                }

                state.conference.seats_available =
                    (seats_before + 1).min(state.conference.max_attendees);
                state.outcome = Some(Ok(true));
            },
        }

        Self::refresh_if_window_touched(seats_before, state.conference.seats_available, env)
    }
}

// ============================================================================
// Session wishlist
// ============================================================================

/// The profile a wishlist change touches, plus the transition outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WishlistState {
    /// Attendee profile
    pub profile: Profile,
    /// Set by the reducer: `Ok(changed)` or the refusal
    pub outcome: Option<Result<bool>>,
}

impl WishlistState {
    /// Fresh state for one transition.
    #[must_use]
    pub const fn new(profile: Profile) -> Self {
        Self {
            profile,
            outcome: None,
        }
    }
}

/// Wishlist commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WishlistAction {
    /// Add a session
    Add(SessionKey),
    /// Remove a session
    Remove(SessionKey),
}

/// Wishlist membership reducer. Sessions are unlimited, so there is no
/// accounting and no effects.
#[derive(Clone, Copy, Debug, Default)]
pub struct WishlistReducer;

impl WishlistReducer {
    /// Apply one action to `profile` in place.
    ///
    /// # Errors
    ///
    /// Returns `Conflict(AlreadyWishlisted)` when adding a session twice;
    /// `profile` is unchanged in that case.
    pub fn apply(&self, profile: &mut Profile, action: WishlistAction) -> Result<bool> {
        let mut state = WishlistState::new(profile.clone());
        let _ = self.reduce(&mut state, action, &());
        let outcome = state.outcome.take().unwrap_or(Ok(false));
        if outcome.is_ok() {
            *profile = state.profile;
        }
        outcome
    }
}

impl Reducer for WishlistReducer {
    type State = WishlistState;
    type Action = WishlistAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            WishlistAction::Add(session) => {
                if state.profile.has_wishlisted(&session) {
                    state.outcome = Some(Err(ConferenceError::Conflict(
                        ConflictReason::AlreadyWishlisted,
                    )));
                } else {
                    state.profile.session_keys_wishlist.push(session);
                    state.outcome = Some(Ok(true));
                }
            },
            WishlistAction::Remove(session) => {
                let before = state.profile.session_keys_wishlist.len();
                state.profile.session_keys_wishlist.retain(|k| *k != session);
                state.outcome = Some(Ok(state.profile.session_keys_wishlist.len() != before));
            },
        }
        SmallVec::new()
    }
}
