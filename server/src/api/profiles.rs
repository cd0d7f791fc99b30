//! Profile API endpoints.
//!
//! The profile is created on first access from the caller's nickname.

use crate::auth::AuthenticatedCaller;
use crate::server::state::AppState;
use axum::{Json, extract::State};
use conference_core::forms::{ProfileForm, ProfileMiniForm};
use conference_web::AppError;

/// Get the caller's profile.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
pub async fn get_profile(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
) -> Result<Json<ProfileForm>, AppError> {
    Ok(Json(state.service.get_profile(&caller).await?))
}

/// Update display name and/or tee shirt size.
///
/// Absent fields are left unchanged.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/profile \
///   -H "Authorization: Bearer <token>" \
///   -H "Content-Type: application/json" \
///   -d '{"displayName": "Ferris", "teeShirtSize": "M_M"}'
/// ```
///
/// # Errors
///
/// - 422 Unprocessable Entity: unknown tee shirt size
/// - 401 Unauthorized: no caller
pub async fn save_profile(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Json(form): Json<ProfileMiniForm>,
) -> Result<Json<ProfileForm>, AppError> {
    Ok(Json(state.service.save_profile(&caller, form).await?))
}
