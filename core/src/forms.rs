//! Wire-level request and response shapes.
//!
//! Field names are camelCase on the wire. Every field is optional on input so
//! that the same shape serves both the create path (defaults fill the gaps)
//! and the update path (absent fields are left untouched).

use crate::types::TeeShirtSize;
use serde::{Deserialize, Serialize};

/// Conference as sent and received by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceForm {
    /// Name (required on create)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Organizer user id (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    /// Topic tags
    pub topics: Vec<String>,
    /// Host city
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Derived month (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    /// Capacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i32>,
    /// Remaining seats (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_available: Option<i32>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Opaque conference key (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    /// Organizer's display name (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_display_name: Option<String>,
}

/// A list of conferences.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceForms {
    /// The conferences
    pub items: Vec<ConferenceForm>,
}

/// One `(field, operator, value)` filter clause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConferenceQueryForm {
    /// Field name (`CITY`, `TOPIC`, `MONTH`, `MAX_ATTENDEES`)
    pub field: String,
    /// Operator name (`EQ`, `GT`, `GTEQ`, `LT`, `LTEQ`, `NE`)
    pub operator: String,
    /// Comparison value; numeric fields are coerced
    pub value: String,
}

impl ConferenceQueryForm {
    /// Convenience constructor.
    #[must_use]
    pub fn new(field: &str, operator: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }
}

/// An ordered list of filter clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConferenceQueryForms {
    /// Clauses, combined with AND
    pub filters: Vec<ConferenceQueryForm>,
}

/// Profile as returned to its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    /// Display name
    pub display_name: String,
    /// Contact email
    pub main_email: String,
    /// T-shirt size
    pub tee_shirt_size: TeeShirtSize,
    /// Opaque keys of the conferences the user attends
    pub conference_keys_to_attend: Vec<String>,
    /// Opaque keys of the sessions on the wishlist
    pub session_keys_wishlist: Vec<String>,
}

/// The user-editable part of a profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileMiniForm {
    /// New display name
    pub display_name: Option<String>,
    /// New t-shirt size
    pub tee_shirt_size: Option<TeeShirtSize>,
}

/// Session as sent and received by callers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionForm {
    /// Name (required on create)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Highlights
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    /// Speaker name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Duration in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    /// Session type tags
    pub type_of_session: Vec<String>,
    /// `YYYY-MM-DD`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Organizer user id (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    /// Opaque session key (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    /// Opaque key of the parent conference (output only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_conference_key: Option<String>,
}

/// A list of sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionForms {
    /// The sessions
    pub items: Vec<SessionForm>,
}

/// Boolean result wrapper.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BooleanMessage {
    /// The result
    pub data: bool,
}

/// String result wrapper.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringMessage {
    /// The result
    pub data: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn conference_form_reads_camel_case_and_tolerates_gaps() {
        let form: ConferenceForm = serde_json::from_str(
            r#"{"name":"RustConf","maxAttendees":100,"startDate":"2025-06-15T00:00:00"}"#,
        )
        .unwrap();

        assert_eq!(form.name.as_deref(), Some("RustConf"));
        assert_eq!(form.max_attendees, Some(100));
        assert_eq!(form.start_date.as_deref(), Some("2025-06-15T00:00:00"));
        assert!(form.topics.is_empty());
        assert!(form.city.is_none());
    }

    #[test]
    fn absent_output_fields_are_not_serialized() {
        let form = SessionForm {
            name: Some("Ownership".into()),
            ..SessionForm::default()
        };
        let json = serde_json::to_value(&form).unwrap();

        assert_eq!(json["name"], "Ownership");
        assert!(json.get("startTime").is_none());
        assert!(json.get("typeOfSession").is_some());
    }
}
