//! Conference API endpoints.
//!
//! - POST /api/v1/conference - Create a conference (requires auth)
//! - PUT /api/v1/conference/:websafeConferenceKey - Update (requires ownership)
//! - GET /api/v1/conference/:websafeConferenceKey - Get one conference
//! - GET /api/v1/conferences/created - Conferences the caller organizes
//! - POST /api/v1/queryConferences - Filtered query
//! - POST|DELETE /api/v1/conference/:websafeConferenceKey/registration - Take or return a seat
//! - GET /api/v1/conferences/attending - Conferences the caller registered for

use crate::auth::AuthenticatedCaller;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use conference_core::forms::{BooleanMessage, ConferenceForm, ConferenceForms, ConferenceQueryForms};
use conference_web::AppError;

/// Create a conference organized by the caller.
///
/// A confirmation email is queued for the caller.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/conference \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"name": "RustConf", "city": "Portland", "maxAttendees": 500,
///        "startDate": "2026-09-10", "endDate": "2026-09-12"}'
/// ```
///
/// # Errors
///
/// - 400 Bad Request: missing name or unparsable date
/// - 401 Unauthorized: no caller
pub async fn create_conference(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(form): Json<ConferenceForm>,
) -> Result<Json<ConferenceForm>, AppError> {
    let conference = state.service.create_conference(&caller, form).await?;
    Ok(Json(conference))
}

/// Update a conference owned by the caller.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 403 Forbidden: caller is not the organizer
/// - 404 Not Found: unknown key
pub async fn update_conference(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_conference_key): Path<String>,
    Json(form): Json<ConferenceForm>,
) -> Result<Json<ConferenceForm>, AppError> {
    let conference = state
        .service
        .update_conference(&caller, &websafe_conference_key, form)
        .await?;
    Ok(Json(conference))
}

/// Get a conference by key. No authentication.
///
/// # Errors
///
/// - 404 Not Found: unknown key
pub async fn get_conference(
    State(state): State<AppState>,
    Path(websafe_conference_key): Path<String>,
) -> Result<Json<ConferenceForm>, AppError> {
    Ok(Json(state.service.get_conference(&websafe_conference_key).await?))
}

/// Conferences organized by the caller.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
pub async fn get_conferences_created(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<ConferenceForms>, AppError> {
    Ok(Json(state.service.get_conferences_created(&caller).await?))
}

/// Query conferences with filters. No authentication.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/queryConferences \
///   -H "Content-Type: application/json" \
///   -d '{"filters": [{"field": "CITY", "operator": "EQ", "value": "London"},
///                    {"field": "MONTH", "operator": "GT", "value": "6"}]}'
/// ```
///
/// # Errors
///
/// - 400 Bad Request: unknown field or operator, unparsable value, or
///   inequality filters on more than one field
pub async fn query_conferences(
    State(state): State<AppState>,
    Json(query): Json<ConferenceQueryForms>,
) -> Result<Json<ConferenceForms>, AppError> {
    Ok(Json(state.service.query_conferences(query).await?))
}

/// Register the caller for a conference.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 404 Not Found: unknown key
/// - 409 Conflict: already registered or no seats left
pub async fn register_for_conference(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_conference_key): Path<String>,
) -> Result<Json<BooleanMessage>, AppError> {
    let result = state
        .service
        .register_for_conference(&caller, &websafe_conference_key)
        .await?;
    Ok(Json(result))
}

/// Unregister the caller from a conference.
///
/// `{"data": false}` when the caller was not registered.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 404 Not Found: unknown key
pub async fn unregister_from_conference(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_conference_key): Path<String>,
) -> Result<Json<BooleanMessage>, AppError> {
    let result = state
        .service
        .unregister_from_conference(&caller, &websafe_conference_key)
        .await?;
    Ok(Json(result))
}

/// Conferences the caller is registered for.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
pub async fn get_conferences_to_attend(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<ConferenceForms>, AppError> {
    Ok(Json(state.service.get_conferences_to_attend(&caller).await?))
}
