//! Entity keys and their web-safe encoding.
//!
//! Keys carry the full ancestor path of an entity:
//!
//! ```text
//! Profile:<user id>
//! Profile:<user id>/Conference:<id>
//! Profile:<user id>/Conference:<id>/Session:<id>
//! ```
//!
//! At the API boundary the path is encoded as unpadded URL-safe base64, so
//! callers only ever see opaque tokens. Decoding a token of the wrong kind is
//! reported as `NotFound`, the same as a token that does not resolve.

use crate::error::{ConferenceError, Result};
use crate::types::{ConferenceId, SessionId, UserId};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::fmt;

const PROFILE_KIND: &str = "Profile";
const CONFERENCE_KIND: &str = "Conference";
const SESSION_KIND: &str = "Session";

/// Key of a conference: the organizer's profile plus the conference id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConferenceKey {
    /// Organizer (ancestor profile)
    pub organizer: UserId,
    /// Conference id
    pub id: ConferenceId,
}

impl ConferenceKey {
    /// Build a key from its parts.
    #[must_use]
    pub const fn new(organizer: UserId, id: ConferenceId) -> Self {
        Self { organizer, id }
    }

    /// Encode as an opaque web-safe token.
    #[must_use]
    pub fn to_websafe(&self) -> String {
        EntityKey::Conference(self.clone()).to_websafe()
    }

    /// Decode a web-safe token that must name a conference.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::NotFound`] if the token is malformed or
    /// names another kind of entity.
    pub fn from_websafe(token: &str) -> Result<Self> {
        match EntityKey::from_websafe(token) {
            Some(EntityKey::Conference(key)) => Ok(key),
            _ => Err(ConferenceError::not_found("conference", token)),
        }
    }
}

impl fmt::Display for ConferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_websafe())
    }
}

impl TryFrom<String> for ConferenceKey {
    type Error = ConferenceError;

    fn try_from(token: String) -> Result<Self> {
        Self::from_websafe(&token)
    }
}

impl From<ConferenceKey> for String {
    fn from(key: ConferenceKey) -> Self {
        key.to_websafe()
    }
}

/// Key of a session: the parent conference key plus the session id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionKey {
    /// Parent conference
    pub conference: ConferenceKey,
    /// Session id
    pub id: SessionId,
}

impl SessionKey {
    /// Build a key from its parts.
    #[must_use]
    pub const fn new(conference: ConferenceKey, id: SessionId) -> Self {
        Self { conference, id }
    }

    /// Encode as an opaque web-safe token.
    #[must_use]
    pub fn to_websafe(&self) -> String {
        EntityKey::Session(self.clone()).to_websafe()
    }

    /// Decode a web-safe token that must name a session.
    ///
    /// # Errors
    ///
    /// Returns [`ConferenceError::NotFound`] if the token is malformed or
    /// names another kind of entity.
    pub fn from_websafe(token: &str) -> Result<Self> {
        match EntityKey::from_websafe(token) {
            Some(EntityKey::Session(key)) => Ok(key),
            _ => Err(ConferenceError::not_found("session", token)),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_websafe())
    }
}

impl TryFrom<String> for SessionKey {
    type Error = ConferenceError;

    fn try_from(token: String) -> Result<Self> {
        Self::from_websafe(&token)
    }
}

impl From<SessionKey> for String {
    fn from(key: SessionKey) -> Self {
        key.to_websafe()
    }
}

/// Any entity key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// A profile (root entity)
    Profile(UserId),
    /// A conference
    Conference(ConferenceKey),
    /// A session
    Session(SessionKey),
}

impl EntityKey {
    /// Ancestor path, e.g. `Profile:42/Conference:7`.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Profile(user) => format!("{PROFILE_KIND}:{}", escape(user.as_str())),
            Self::Conference(key) => format!(
                "{}/{CONFERENCE_KIND}:{}",
                Self::Profile(key.organizer.clone()).path(),
                key.id
            ),
            Self::Session(key) => format!(
                "{}/{SESSION_KIND}:{}",
                Self::Conference(key.conference.clone()).path(),
                key.id
            ),
        }
    }

    /// Encode as an opaque web-safe token.
    #[must_use]
    pub fn to_websafe(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.path())
    }

    /// Decode a web-safe token, returning `None` if it is not a valid key.
    #[must_use]
    pub fn from_websafe(token: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
        let path = String::from_utf8(bytes).ok()?;
        Self::parse_path(&path)
    }

    fn parse_path(path: &str) -> Option<Self> {
        let mut segments = path.split('/');

        let user = segments.next()?.strip_prefix("Profile:")?;
        let user = UserId::new(unescape(user)?);

        let Some(segment) = segments.next() else {
            return Some(Self::Profile(user));
        };
        let id = parse_id(segment, CONFERENCE_KIND)?;
        let conference = ConferenceKey::new(user, ConferenceId::new(id));

        let Some(segment) = segments.next() else {
            return Some(Self::Conference(conference));
        };
        let id = parse_id(segment, SESSION_KIND)?;

        if segments.next().is_some() {
            return None;
        }
        Some(Self::Session(SessionKey::new(conference, SessionId::new(id))))
    }
}

fn parse_id(segment: &str, kind: &str) -> Option<i64> {
    let (segment_kind, id) = segment.split_once(':')?;
    if segment_kind != kind {
        return None;
    }
    id.parse().ok()
}

// User ids come from the identity provider and may contain the path separator.
fn escape(raw: &str) -> String {
    raw.replace('%', "%25").replace('/', "%2F")
}

fn unescape(escaped: &str) -> Option<String> {
    if escaped.is_empty() {
        return None;
    }
    Some(escaped.replace("%2F", "/").replace("%25", "%"))
}
