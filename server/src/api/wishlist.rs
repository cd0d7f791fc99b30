//! Wishlist API endpoints.

use crate::auth::AuthenticatedCaller;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use conference_core::forms::{BooleanMessage, SessionForms};
use conference_web::AppError;
use serde::Deserialize;

/// Query parameters for listing the wishlist.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistQuery {
    /// Restrict to sessions of one conference
    pub websafe_conference_key: Option<String>,
}

/// Add a session to the caller's wishlist.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 404 Not Found: unknown session
/// - 409 Conflict: already on the wishlist
pub async fn add_session_to_wishlist(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_session_key): Path<String>,
) -> Result<Json<BooleanMessage>, AppError> {
    let result = state
        .service
        .add_session_to_wishlist(&caller, &websafe_session_key)
        .await?;
    Ok(Json(result))
}

/// Remove a session from the caller's wishlist.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 404 Not Found: token is not a session key
pub async fn delete_session_in_wishlist(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Path(websafe_session_key): Path<String>,
) -> Result<Json<BooleanMessage>, AppError> {
    let result = state
        .service
        .delete_session_in_wishlist(&caller, &websafe_session_key)
        .await?;
    Ok(Json(result))
}

/// Sessions on the caller's wishlist.
///
/// # Errors
///
/// - 401 Unauthorized: no caller
/// - 404 Not Found: unknown conference
pub async fn get_sessions_in_wishlist(
    State(state): State<AppState>,
    AuthenticatedCaller(caller): AuthenticatedCaller,
    Query(query): Query<WishlistQuery>,
) -> Result<Json<SessionForms>, AppError> {
    let sessions = state
        .service
        .get_sessions_in_wishlist(&caller, query.websafe_conference_key.as_deref())
        .await?;
    Ok(Json(sessions))
}
