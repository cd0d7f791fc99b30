//! Error taxonomy shared by every Conference Central crate.
//!
//! Adapters (PostgreSQL, Redis, the task channel) map their native errors into
//! [`ConferenceError`] at the boundary, and the web layer maps the taxonomy onto
//! HTTP responses. Nothing above the adapters sees a driver error type.

use thiserror::Error;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, ConferenceError>;

/// Reason a registration or wishlist transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// The attendee is already registered for the conference.
    AlreadyRegistered,
    /// The conference has no seats left.
    SeatsExhausted,
    /// The session is already on the attendee's wishlist.
    AlreadyWishlisted,
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRegistered => write!(f, "You have already registered for this conference"),
            Self::SeatsExhausted => write!(f, "There are no seats available."),
            Self::AlreadyWishlisted => write!(f, "You have already added this session to your wishlist"),
        }
    }
}

/// Errors surfaced by Conference Central operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConferenceError {
    // ═══════════════════════════════════════════════════════════
    // Caller errors
    // ═══════════════════════════════════════════════════════════

    /// No caller identity was supplied for an operation that requires one.
    #[error("Authorization required")]
    Unauthenticated,

    /// The caller is not allowed to touch the target entity.
    #[error("{0}")]
    Forbidden(String),

    /// A referenced key does not resolve (or resolves to the wrong kind).
    #[error("No {kind} found with key: {key}")]
    NotFound {
        /// Entity kind that was expected
        kind: &'static str,
        /// The key as supplied by the caller
        key: String,
    },

    /// Malformed input (missing required field, unparsable date/time, bad number).
    #[error("{0}")]
    BadRequest(String),

    /// Disallowed query filter (unknown field/operator, second inequality field).
    #[error("{0}")]
    InvalidFilter(String),

    /// A state transition was refused.
    #[error("{0}")]
    Conflict(ConflictReason),

    // ═══════════════════════════════════════════════════════════
    // Infrastructure errors
    // ═══════════════════════════════════════════════════════════

    /// A transaction lost a lock race and may be retried.
    #[error("Transaction conflict: {0}")]
    TransactionConflict(String),

    /// Entity store failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Announcement cache failure.
    #[error("Cache error: {0}")]
    Cache(String),

    /// Task queue failure.
    #[error("Task queue error: {0}")]
    Queue(String),
}

impl ConferenceError {
    /// Shorthand for [`ConferenceError::NotFound`].
    #[must_use]
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Shorthand for [`ConferenceError::BadRequest`].
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Shorthand for [`ConferenceError::InvalidFilter`].
    #[must_use]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// Whether a retry of the same operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::TransactionConflict(_))
    }
}
