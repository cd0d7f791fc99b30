//! Cached announcement endpoints. Both answer `{"data": ""}` when nothing is
//! cached.

use crate::server::state::AppState;
use axum::{Json, extract::State};
use conference_core::forms::StringMessage;
use conference_web::AppError;

/// Current near-sold-out notice.
///
/// # Errors
///
/// - 500 Internal Server Error: cache unreachable
pub async fn get_announcement(State(state): State<AppState>) -> Result<Json<StringMessage>, AppError> {
    Ok(Json(state.service.get_announcement().await?))
}

/// Current featured-speaker notice.
///
/// # Errors
///
/// - 500 Internal Server Error: cache unreachable
pub async fn get_featured_speaker(
    State(state): State<AppState>,
) -> Result<Json<StringMessage>, AppError> {
    Ok(Json(state.service.get_featured_speaker().await?))
}
