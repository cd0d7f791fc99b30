//! Row decoding.

use conference_core::{
    Conference, ConferenceError, ConferenceId, ConferenceKey, Profile, Result, Session, SessionId,
    SessionKey, UserId,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

pub const CONFERENCE_COLUMNS: &str = "id, organizer_user_id, name, description, topics, city, \
     start_date, end_date, month, max_attendees, seats_available";

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| ConferenceError::Storage(format!("column {name}: {e}")))
}

pub fn profile_from_row(row: &PgRow) -> Result<Profile> {
    let size: String = column(row, "tee_shirt_size")?;
    let conferences: Vec<String> = column(row, "conference_keys_to_attend")?;
    let wishlist: Vec<String> = column(row, "session_keys_wishlist")?;

    Ok(Profile {
        user_id: UserId::new(column::<String>(row, "user_id")?),
        display_name: column(row, "display_name")?,
        main_email: column(row, "main_email")?,
        tee_shirt_size: size.parse().map_err(ConferenceError::Storage)?,
        conference_keys_to_attend: conferences
            .iter()
            .map(|token| ConferenceKey::from_websafe(token).map_err(corrupt_key))
            .collect::<Result<_>>()?,
        session_keys_wishlist: wishlist
            .iter()
            .map(|token| SessionKey::from_websafe(token).map_err(corrupt_key))
            .collect::<Result<_>>()?,
    })
}

#[allow(clippy::needless_pass_by_value)] // used as a map_err adapter
fn corrupt_key(error: ConferenceError) -> ConferenceError {
    ConferenceError::Storage(format!("stored key does not decode: {error}"))
}

pub fn conference_from_row(row: &PgRow) -> Result<Conference> {
    let organizer = UserId::new(column::<String>(row, "organizer_user_id")?);
    let id = ConferenceId::new(column(row, "id")?);

    Ok(Conference {
        key: ConferenceKey::new(organizer, id),
        name: column(row, "name")?,
        description: column(row, "description")?,
        topics: column(row, "topics")?,
        city: column(row, "city")?,
        start_date: column(row, "start_date")?,
        end_date: column(row, "end_date")?,
        month: column(row, "month")?,
        max_attendees: column(row, "max_attendees")?,
        seats_available: column(row, "seats_available")?,
    })
}

pub fn session_from_row(row: &PgRow) -> Result<Session> {
    let organizer = UserId::new(column::<String>(row, "organizer_user_id")?);
    let conference = ConferenceKey::new(organizer, ConferenceId::new(column(row, "conference_id")?));

    Ok(Session {
        key: SessionKey::new(conference, SessionId::new(column(row, "id")?)),
        name: column(row, "name")?,
        highlights: column(row, "highlights")?,
        speaker: column(row, "speaker")?,
        duration: column(row, "duration")?,
        type_of_session: column(row, "type_of_session")?,
        date: column(row, "date")?,
        start_time: column(row, "start_time")?,
    })
}

pub fn websafe_conference_keys(profile: &Profile) -> Vec<String> {
    profile
        .conference_keys_to_attend
        .iter()
        .map(ConferenceKey::to_websafe)
        .collect()
}

pub fn websafe_session_keys(profile: &Profile) -> Vec<String> {
    profile
        .session_keys_wishlist
        .iter()
        .map(SessionKey::to_websafe)
        .collect()
}
