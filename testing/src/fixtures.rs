//! Builders for the callers and forms that tests use over and over.

use conference_core::forms::{ConferenceForm, SessionForm};
use conference_core::{Caller, UserId};

/// A caller whose email and nickname derive from `id`.
#[must_use]
pub fn caller(id: &str) -> Caller {
    Caller {
        user_id: UserId::new(id),
        email: format!("{id}@example.com"),
        nickname: id.to_string(),
    }
}

/// A create request with a name and a capacity.
#[must_use]
pub fn conference_form(name: &str, max_attendees: i32) -> ConferenceForm {
    ConferenceForm {
        name: Some(name.to_string()),
        max_attendees: Some(max_attendees),
        ..ConferenceForm::default()
    }
}

/// A create request for a dated session.
#[must_use]
pub fn session_form(name: &str, speaker: &str, date: &str) -> SessionForm {
    SessionForm {
        name: Some(name.to_string()),
        speaker: Some(speaker.to_string()),
        date: Some(date.to_string()),
        ..SessionForm::default()
    }
}
