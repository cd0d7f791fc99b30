//! # Conference Central Core
//!
//! Domain types, business rules and collaborator traits for Conference
//! Central, a conference/session/profile API.
//!
//! ## Core Concepts
//!
//! - **Keys**: entities are addressed by their ancestor path
//!   (profile → conference → session), exposed to callers as opaque tokens
//! - **Mapper**: explicit field-by-field conversion between wire forms and entities
//! - **Filter compiler**: validated conference queries with the
//!   single-inequality-field rule
//! - **Reducers**: the registration and wishlist state machines, pure
//!   functions `(State, Action, Environment) → Effects`
//! - **Collaborators**: entity store, announcement cache, task queue,
//!   identity and email providers, injected as trait objects
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Explicit effects (no hidden I/O in reducers)
//! - Dependency injection via traits
//!
//! ## Example
//!
//! ```ignore
//! use conference_core::registration::*;
//!
//! let mut state = RegistrationState::new(profile, conference);
//! let (outcome, effects) = RegistrationReducer.transition(
//!     &mut state,
//!     RegistrationAction::Register,
//!     &env,
//! );
//! assert_eq!(outcome, Ok(true));
//! ```

pub mod announcement;
pub mod error;
pub mod filter;
pub mod forms;
pub mod key;
pub mod mapper;
pub mod providers;
pub mod registration;
pub mod store;
pub mod tasks;
pub mod types;

pub use error::{ConferenceError, ConflictReason, Result};
pub use key::{ConferenceKey, EntityKey, SessionKey};
pub use types::{
    Caller, Conference, ConferenceId, NewConference, NewSession, Profile, Session, SessionId,
    TeeShirtSize, UserId,
};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → Effects`.
/// They validate the action, update state in place and describe side effects
/// for the runtime to execute.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for WishlistReducer {
    ///     type State = WishlistState;
    ///     type Action = WishlistAction;
    ///     type Environment = ();
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut WishlistState,
    ///         action: WishlistAction,
    ///         _env: &(),
    ///     ) -> SmallVec<[Effect<WishlistAction>; 4]> {
    ///         // Business logic here
    ///         SmallVec::new()
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// Effects to be executed by the runtime once the state change is durable
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values, not execution. Reducers return them and the runtime
/// runs them after the surrounding transaction commits.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if Some, the action is fed back to the caller
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Whether the effect does nothing.
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - Dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
