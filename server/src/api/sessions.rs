//! Session API endpoints.
//!
//! Sessions are children of a conference; only the conference organizer may
//! create, update or delete them. All reads are public.

use crate::auth::AuthenticatedCaller;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use conference_core::forms::{BooleanMessage, SessionForm, SessionForms};
use conference_web::AppError;
use serde::Deserialize;

// ============================================================================
// Request Types
// ============================================================================

/// Query parameters for the date-range search.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// Restrict to one conference
    pub websafe_conference_key: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`
    pub end_date: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a session in a conference the caller organizes.
///
/// The speaker's featured-speaker notice is recomputed in the background.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/conference/<key>/sessions \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"name": "Ownership", "speaker": "Ferris", "typeOfSession": ["TALK"],
///        "date": "2026-09-10", "startTime": "10:30", "duration": 45}'
/// ```
///
/// # Errors
///
/// - 400 Bad Request: missing name or unparsable date/time
/// - 401 Unauthorized: no caller
/// - 403 Forbidden: caller is not the conference organizer
/// - 404 Not Found: unknown conference
pub async fn create_session(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_conference_key): Path<String>,
    Json(form): Json<SessionForm>,
) -> Result<Json<SessionForm>, AppError> {
    let session = state
        .service
        .create_session(&caller, &websafe_conference_key, form)
        .await?;
    Ok(Json(session))
}

/// Update a session.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 403 Forbidden: caller is not the organizer
/// - 404 Not Found: unknown session
pub async fn update_session(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_session_key): Path<String>,
    Json(form): Json<SessionForm>,
) -> Result<Json<SessionForm>, AppError> {
    let session = state
        .service
        .update_session(&caller, &websafe_session_key, form)
        .await?;
    Ok(Json(session))
}

/// Delete a session.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 403 Forbidden: caller is not the organizer
/// - 404 Not Found: unknown session
pub async fn delete_session(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_session_key): Path<String>,
) -> Result<Json<BooleanMessage>, AppError> {
    let result = state
        .service
        .delete_session(&caller, &websafe_session_key)
        .await?;
    Ok(Json(result))
}

/// Get one session.
///
/// # Errors
///
/// - 404 Not Found: unknown session
pub async fn get_session(
    State(state): State<AppState>,
    Path(websafe_session_key): Path<String>,
) -> Result<Json<SessionForm>, AppError> {
    Ok(Json(state.service.get_session(&websafe_session_key).await?))
}

/// All sessions of a conference.
///
/// # Errors
///
/// - 404 Not Found: unknown conference
pub async fn get_conference_sessions(
    State(state): State<AppState>,
    Path(websafe_conference_key): Path<String>,
) -> Result<Json<SessionForms>, AppError> {
    let sessions = state
        .service
        .get_conference_sessions(&websafe_conference_key)
        .await?;
    Ok(Json(sessions))
}

/// Sessions of a conference tagged with one session type.
///
/// # Errors
///
/// - 404 Not Found: unknown conference
pub async fn get_conference_sessions_by_type(
    State(state): State<AppState>,
    Path((websafe_conference_key, type_of_session)): Path<(String, String)>,
) -> Result<Json<SessionForms>, AppError> {
    let sessions = state
        .service
        .get_conference_sessions_by_type(&websafe_conference_key, &type_of_session)
        .await?;
    Ok(Json(sessions))
}

/// Sessions given by a speaker across all conferences.
pub async fn get_sessions_by_speaker(
    State(state): State<AppState>,
    Path(speaker): Path<String>,
) -> Result<Json<SessionForms>, AppError> {
    Ok(Json(state.service.get_sessions_by_speaker(&speaker).await?))
}

/// Dated sessions inside an inclusive date range.
///
/// # Example
///
/// ```bash
/// curl "http://localhost:8080/api/v1/sessions?startDate=2026-09-01&endDate=2026-09-30"
/// ```
///
/// # Errors
///
/// - 400 Bad Request: unparsable date
/// - 404 Not Found: unknown conference
pub async fn get_sessions_in_date_range(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Json<SessionForms>, AppError> {
    let sessions = state
        .service
        .get_sessions_in_date_range(
            query.websafe_conference_key.as_deref(),
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )
        .await?;
    Ok(Json(sessions))
}
