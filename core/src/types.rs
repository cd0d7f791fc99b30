//! Domain types for Conference Central.
//!
//! Profiles own conferences, conferences own sessions. Ownership is carried by
//! the keys (see [`crate::key`]); registration and wishlist relationships are
//! plain key lists on the [`Profile`].

use crate::key::{ConferenceKey, SessionKey};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Stable identifier of an authenticated user, as issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a conference, allocated by the entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConferenceId(i64);

impl ConferenceId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Numeric identifier of a session, allocated by the entity store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(i64);

impl SessionId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Caller
// ============================================================================

/// Identity of the authenticated caller of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Stable user identifier
    pub user_id: UserId,
    /// Contact email
    pub email: String,
    /// Nickname, used as the initial display name
    pub nickname: String,
}

// ============================================================================
// Profile
// ============================================================================

/// T-shirt size of an attendee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    XsM,
    XsW,
    SM,
    SW,
    MM,
    MW,
    LM,
    LW,
    XlM,
    XlW,
    XxlM,
    XxlW,
    XxxlM,
    XxxlW,
}

impl TeeShirtSize {
    /// Every size, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::NotSpecified,
        Self::XsM,
        Self::XsW,
        Self::SM,
        Self::SW,
        Self::MM,
        Self::MW,
        Self::LM,
        Self::LW,
        Self::XlM,
        Self::XlW,
        Self::XxlM,
        Self::XxlW,
        Self::XxxlM,
        Self::XxxlW,
    ];

    /// Wire name of the size (e.g. `XL_W`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotSpecified => "NOT_SPECIFIED",
            Self::XsM => "XS_M",
            Self::XsW => "XS_W",
            Self::SM => "S_M",
            Self::SW => "S_W",
            Self::MM => "M_M",
            Self::MW => "M_W",
            Self::LM => "L_M",
            Self::LW => "L_W",
            Self::XlM => "XL_M",
            Self::XlW => "XL_W",
            Self::XxlM => "XXL_M",
            Self::XxlW => "XXL_W",
            Self::XxxlM => "XXXL_M",
            Self::XxxlW => "XXXL_W",
        }
    }
}

impl fmt::Display for TeeShirtSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TeeShirtSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| format!("Unknown t-shirt size: {s}"))
    }
}

/// An attendee's profile. Created lazily on first access, never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Owner of the profile
    pub user_id: UserId,
    /// Display name
    pub display_name: String,
    /// Contact email
    pub main_email: String,
    /// T-shirt size
    pub tee_shirt_size: TeeShirtSize,
    /// Conferences the user is registered for, in registration order
    pub conference_keys_to_attend: Vec<ConferenceKey>,
    /// Sessions the user wishes to attend, in insertion order
    pub session_keys_wishlist: Vec<SessionKey>,
}

impl Profile {
    /// Whether the profile is registered for `conference`.
    #[must_use]
    pub fn is_attending(&self, conference: &ConferenceKey) -> bool {
        self.conference_keys_to_attend.contains(conference)
    }

    /// Whether `session` is on the wishlist.
    #[must_use]
    pub fn has_wishlisted(&self, session: &SessionKey) -> bool {
        self.session_keys_wishlist.contains(session)
    }
}

// ============================================================================
// Conference
// ============================================================================

/// Conference fields before the store has allocated an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewConference {
    /// Organizer (owner) of the conference
    pub organizer_user_id: UserId,
    /// Name (required)
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Topic tags
    pub topics: Vec<String>,
    /// Host city
    pub city: String,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
    /// Month of `start_date`, or 0
    pub month: i32,
    /// Capacity
    pub max_attendees: i32,
    /// Remaining seats
    pub seats_available: i32,
}

impl NewConference {
    /// Attach the allocated identifier.
    #[must_use]
    pub fn into_conference(self, id: ConferenceId) -> Conference {
        Conference {
            key: ConferenceKey::new(self.organizer_user_id, id),
            name: self.name,
            description: self.description,
            topics: self.topics,
            city: self.city,
            start_date: self.start_date,
            end_date: self.end_date,
            month: self.month,
            max_attendees: self.max_attendees,
            seats_available: self.seats_available,
        }
    }
}

/// A stored conference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    /// Key (embeds the organizer)
    pub key: ConferenceKey,
    /// Name
    pub name: String,
    /// Free-form description
    pub description: Option<String>,
    /// Topic tags
    pub topics: Vec<String>,
    /// Host city
    pub city: String,
    /// First day
    pub start_date: Option<NaiveDate>,
    /// Last day
    pub end_date: Option<NaiveDate>,
    /// Month of `start_date` (1-12), or 0 when there is no start date
    pub month: i32,
    /// Capacity
    pub max_attendees: i32,
    /// Remaining seats, always within `[0, max_attendees]` once capacity is set
    pub seats_available: i32,
}

impl Conference {
    /// Organizer of the conference.
    #[must_use]
    pub const fn organizer_user_id(&self) -> &UserId {
        &self.key.organizer
    }
}

// ============================================================================
// Session
// ============================================================================

/// Session fields before the store has allocated an identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewSession {
    /// Parent conference
    pub conference: ConferenceKey,
    /// Name (required)
    pub name: String,
    /// Highlights
    pub highlights: Option<String>,
    /// Speaker name
    pub speaker: String,
    /// Duration in minutes
    pub duration: i32,
    /// Session type tags
    pub type_of_session: Vec<String>,
    /// Day of the session
    pub date: Option<NaiveDate>,
    /// Start time (24h)
    pub start_time: Option<NaiveTime>,
}

impl NewSession {
    /// Attach the allocated identifier.
    #[must_use]
    pub fn into_session(self, id: SessionId) -> Session {
        Session {
            key: SessionKey::new(self.conference, id),
            name: self.name,
            highlights: self.highlights,
            speaker: self.speaker,
            duration: self.duration,
            type_of_session: self.type_of_session,
            date: self.date,
            start_time: self.start_time,
        }
    }
}

/// A stored session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Key (embeds the parent conference and its organizer)
    pub key: SessionKey,
    /// Name
    pub name: String,
    /// Highlights
    pub highlights: Option<String>,
    /// Speaker name
    pub speaker: String,
    /// Duration in minutes
    pub duration: i32,
    /// Session type tags
    pub type_of_session: Vec<String>,
    /// Day of the session
    pub date: Option<NaiveDate>,
    /// Start time (24h)
    pub start_time: Option<NaiveTime>,
}

impl Session {
    /// Organizer of the parent conference.
    #[must_use]
    pub const fn organizer_user_id(&self) -> &UserId {
        &self.key.conference.organizer
    }
}
