//! Conversions between wire forms and stored entities.
//!
//! Each entity/form pair has an explicit field list. The create path fills
//! defaults for absent or empty values and writes them back into the inbound
//! form, so the caller sees what was actually stored. The update path touches
//! only fields that are present and non-empty.

use crate::error::{ConferenceError, Result};
use crate::forms::{ConferenceForm, ProfileForm, ProfileMiniForm, SessionForm};
use crate::types::{Caller, Conference, NewConference, NewSession, Profile, Session, TeeShirtSize};
use chrono::{Datelike, NaiveDate, NaiveTime};

/// Default host city.
pub const DEFAULT_CITY: &str = "Default City";
/// Default capacity.
pub const DEFAULT_MAX_ATTENDEES: i32 = 0;
/// Default remaining seats.
pub const DEFAULT_SEATS_AVAILABLE: i32 = 0;
/// Default topics.
pub const DEFAULT_TOPICS: [&str; 2] = ["Default", "Topic"];
/// Default session length in minutes.
pub const DEFAULT_SESSION_DURATION: i32 = 120;
/// Default session types.
pub const DEFAULT_SESSION_TYPES: [&str; 2] = ["Default", "Session"];
/// Default speaker.
pub const DEFAULT_SPEAKER: &str = "speaker";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

// ============================================================================
// Scalar converters
// ============================================================================

/// Parse a date from the first ten characters of `raw` (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if the prefix is not a valid date.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, DATE_FORMAT)
        .map_err(|e| ConferenceError::bad_request(format!("Invalid {field} '{raw}': {e}")))
}

/// Parse a 24-hour `HH:MM` time.
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if `raw` is not a valid time.
pub fn parse_time(field: &str, raw: &str) -> Result<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|e| ConferenceError::bad_request(format!("Invalid {field} '{raw}': {e}")))
}

/// Render a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Render a time as `HH:MM`.
#[must_use]
pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Month number of an optional start date, 0 when absent.
#[must_use]
pub fn derive_month(start_date: Option<NaiveDate>) -> i32 {
    start_date.map_or(0, |date| i32::try_from(date.month()).unwrap_or(0))
}

/// `Some(value)` only when the string is present and not blank.
fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

fn parse_optional_date(field: &str, value: Option<&String>) -> Result<Option<NaiveDate>> {
    non_empty(value).map(|raw| parse_date(field, raw)).transpose()
}

fn default_strings(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(ToString::to_string).collect()
}

// ============================================================================
// Conference
// ============================================================================

/// Build a new conference from a create request owned by `caller`.
///
/// Defaults are written back into `form`, together with the organizer id.
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if the name is missing or a date
/// does not parse.
pub fn new_conference(form: &mut ConferenceForm, caller: &Caller) -> Result<NewConference> {
    let name = non_empty(form.name.as_ref())
        .ok_or_else(|| ConferenceError::bad_request("Conference 'name' field required"))?
        .to_string();

    if non_empty(form.city.as_ref()).is_none() {
        form.city = Some(DEFAULT_CITY.to_string());
    }
    if form.topics.is_empty() {
        form.topics = default_strings(&DEFAULT_TOPICS);
    }
    let max_attendees = *form.max_attendees.get_or_insert(DEFAULT_MAX_ATTENDEES);
    if max_attendees < 0 {
        return Err(ConferenceError::bad_request("maxAttendees must not be negative"));
    }

    let start_date = parse_optional_date("startDate", form.start_date.as_ref())?;
    let end_date = parse_optional_date("endDate", form.end_date.as_ref())?;
    let month = derive_month(start_date);

    let seats_available = if max_attendees > 0 {
        max_attendees
    } else {
        DEFAULT_SEATS_AVAILABLE
    };

    form.month = Some(month);
    form.seats_available = Some(seats_available);
    form.organizer_user_id = Some(caller.user_id.to_string());

    Ok(NewConference {
        organizer_user_id: caller.user_id.clone(),
        name,
        description: non_empty(form.description.as_ref()).map(str::to_string),
        topics: form.topics.clone(),
        city: form.city.clone().unwrap_or_else(|| DEFAULT_CITY.to_string()),
        start_date,
        end_date,
        month,
        max_attendees,
        seats_available,
    })
}

/// Apply the present, non-empty fields of `form` to `conference`.
///
/// `seatsAvailable`, `month` and `organizerUserId` are never taken from the
/// form. A changed `startDate` re-derives the month. A changed
/// `maxAttendees` shifts the remaining seats by the same amount.
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if a date does not parse, the
/// capacity is negative, or the capacity is below the seats already taken.
/// `conference` is left untouched in that case.
pub fn apply_conference_update(conference: &mut Conference, form: &ConferenceForm) -> Result<()> {
    let start_date = parse_optional_date("startDate", form.start_date.as_ref())?;
    let end_date = parse_optional_date("endDate", form.end_date.as_ref())?;
    let taken = conference.max_attendees - conference.seats_available;
    if let Some(max) = form.max_attendees {
        if max < 0 {
            return Err(ConferenceError::bad_request("maxAttendees must not be negative"));
        }
        if max < taken {
            return Err(ConferenceError::bad_request(format!(
                "maxAttendees must be at least the {taken} seats already taken"
            )));
        }
    }

    if let Some(name) = non_empty(form.name.as_ref()) {
        conference.name = name.to_string();
    }
    if let Some(description) = non_empty(form.description.as_ref()) {
        conference.description = Some(description.to_string());
    }
    if !form.topics.is_empty() {
        conference.topics.clone_from(&form.topics);
    }
    if let Some(city) = non_empty(form.city.as_ref()) {
        conference.city = city.to_string();
    }
    if let Some(date) = start_date {
        conference.start_date = Some(date);
        conference.month = derive_month(Some(date));
    }
    if let Some(date) = end_date {
        conference.end_date = Some(date);
    }
    if let Some(max) = form.max_attendees {
        conference.max_attendees = max;
        conference.seats_available = max - taken;
    }
    Ok(())
}

/// Render a conference for callers.
#[must_use]
pub fn conference_to_form(conference: &Conference, organizer_display_name: Option<&str>) -> ConferenceForm {
    ConferenceForm {
        name: Some(conference.name.clone()),
        description: conference.description.clone(),
        organizer_user_id: Some(conference.organizer_user_id().to_string()),
        topics: conference.topics.clone(),
        city: Some(conference.city.clone()),
        start_date: conference.start_date.map(format_date),
        month: Some(conference.month),
        max_attendees: Some(conference.max_attendees),
        seats_available: Some(conference.seats_available),
        end_date: conference.end_date.map(format_date),
        websafe_key: Some(conference.key.to_websafe()),
        organizer_display_name: organizer_display_name.map(str::to_string),
    }
}

// ============================================================================
// Profile
// ============================================================================

/// First-access profile for `caller`.
#[must_use]
pub fn new_profile(caller: &Caller) -> Profile {
    Profile {
        user_id: caller.user_id.clone(),
        display_name: caller.nickname.clone(),
        main_email: caller.email.clone(),
        tee_shirt_size: TeeShirtSize::NotSpecified,
        conference_keys_to_attend: Vec::new(),
        session_keys_wishlist: Vec::new(),
    }
}

/// Apply the editable fields of `form`. Returns whether anything changed.
pub fn apply_profile_update(profile: &mut Profile, form: &ProfileMiniForm) -> bool {
    let mut changed = false;
    if let Some(name) = non_empty(form.display_name.as_ref()) {
        if profile.display_name != name {
            profile.display_name = name.to_string();
            changed = true;
        }
    }
    if let Some(size) = form.tee_shirt_size {
        if profile.tee_shirt_size != size {
            profile.tee_shirt_size = size;
            changed = true;
        }
    }
    changed
}

/// Render a profile for its owner.
#[must_use]
pub fn profile_to_form(profile: &Profile) -> ProfileForm {
    ProfileForm {
        display_name: profile.display_name.clone(),
        main_email: profile.main_email.clone(),
        tee_shirt_size: profile.tee_shirt_size,
        conference_keys_to_attend: profile
            .conference_keys_to_attend
            .iter()
            .map(crate::key::ConferenceKey::to_websafe)
            .collect(),
        session_keys_wishlist: profile
            .session_keys_wishlist
            .iter()
            .map(crate::key::SessionKey::to_websafe)
            .collect(),
    }
}

// ============================================================================
// Session
// ============================================================================

/// Build a new session under `conference` from a create request.
///
/// Defaults are written back into `form`, together with the organizer id.
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if the name is missing or the
/// date/time does not parse.
pub fn new_session(form: &mut SessionForm, conference: &Conference) -> Result<NewSession> {
    let name = non_empty(form.name.as_ref())
        .ok_or_else(|| ConferenceError::bad_request("Session 'name' field required"))?
        .to_string();

    let duration = *form.duration.get_or_insert(DEFAULT_SESSION_DURATION);
    if form.type_of_session.is_empty() {
        form.type_of_session = default_strings(&DEFAULT_SESSION_TYPES);
    }
    if non_empty(form.speaker.as_ref()).is_none() {
        form.speaker = Some(DEFAULT_SPEAKER.to_string());
    }

    let date = parse_optional_date("date", form.date.as_ref())?;
    let start_time = non_empty(form.start_time.as_ref())
        .map(|raw| parse_time("startTime", raw))
        .transpose()?;

    form.organizer_user_id = Some(conference.organizer_user_id().to_string());
    form.websafe_conference_key = Some(conference.key.to_websafe());

    Ok(NewSession {
        conference: conference.key.clone(),
        name,
        highlights: non_empty(form.highlights.as_ref()).map(str::to_string),
        speaker: form.speaker.clone().unwrap_or_else(|| DEFAULT_SPEAKER.to_string()),
        duration,
        type_of_session: form.type_of_session.clone(),
        date,
        start_time,
    })
}

/// Apply the present, non-empty fields of `form` to `session`.
///
/// # Errors
///
/// Returns [`ConferenceError::BadRequest`] if the date/time does not parse.
/// `session` is left untouched in that case.
pub fn apply_session_update(session: &mut Session, form: &SessionForm) -> Result<()> {
    let date = parse_optional_date("date", form.date.as_ref())?;
    let start_time = non_empty(form.start_time.as_ref())
        .map(|raw| parse_time("startTime", raw))
        .transpose()?;

    if let Some(name) = non_empty(form.name.as_ref()) {
        session.name = name.to_string();
    }
    if let Some(highlights) = non_empty(form.highlights.as_ref()) {
        session.highlights = Some(highlights.to_string());
    }
    if let Some(speaker) = non_empty(form.speaker.as_ref()) {
        session.speaker = speaker.to_string();
    }
    if let Some(duration) = form.duration {
        session.duration = duration;
    }
    if !form.type_of_session.is_empty() {
        session.type_of_session.clone_from(&form.type_of_session);
    }
    if date.is_some() {
        session.date = date;
    }
    if start_time.is_some() {
        session.start_time = start_time;
    }
    Ok(())
}

/// Render a session for callers.
#[must_use]
pub fn session_to_form(session: &Session) -> SessionForm {
    SessionForm {
        name: Some(session.name.clone()),
        highlights: session.highlights.clone(),
        speaker: Some(session.speaker.clone()),
        duration: Some(session.duration),
        type_of_session: session.type_of_session.clone(),
        date: session.date.map(format_date),
        start_time: session.start_time.map(format_time),
        organizer_user_id: Some(session.organizer_user_id().to_string()),
        websafe_key: Some(session.key.to_websafe()),
        websafe_conference_key: Some(session.key.conference.to_websafe()),
    }
}
