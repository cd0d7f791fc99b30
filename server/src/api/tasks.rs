//! Internal task and cron endpoints.
//!
//! These run a [`Task`] synchronously and are guarded by the shared
//! `X-Task-Token` secret rather than caller authentication:
//!
//! - POST /tasks/send_confirmation_email
//! - POST /tasks/set_featured_speaker
//! - GET /crons/set_announcement

use crate::auth::TaskAuthorized;
use crate::server::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use conference_core::forms::StringMessage;
use conference_core::tasks::Task;
use conference_web::AppError;
use serde::Deserialize;

/// Body of `POST /tasks/send_confirmation_email`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationEmailRequest {
    /// Recipient
    pub email: String,
    /// Conference dump to include
    pub conference_info: String,
}

/// Body of `POST /tasks/set_featured_speaker`.
#[derive(Debug, Deserialize)]
pub struct FeaturedSpeakerRequest {
    /// Speaker to evaluate
    pub speaker: String,
}

/// Send a conference confirmation email.
///
/// # Errors
///
/// - 403 Forbidden: missing or wrong task token
pub async fn send_confirmation_email(
    State(state): State<AppState>,
    _: TaskAuthorized,
    Json(request): Json<ConfirmationEmailRequest>,
) -> Result<StatusCode, AppError> {
    state
        .runner
        .run(Task::SendConfirmationEmail {
            email: request.email,
            conference_info: request.conference_info,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recompute the featured-speaker notice for one speaker.
///
/// Answers with the cached notice, or `""` if the speaker does not qualify.
///
/// # Errors
///
/// - 403 Forbidden: missing or wrong task token
pub async fn set_featured_speaker(
    State(state): State<AppState>,
    _: TaskAuthorized,
    Json(request): Json<FeaturedSpeakerRequest>,
) -> Result<Json<StringMessage>, AppError> {
    let notice = state
        .runner
        .run(Task::SetFeaturedSpeaker {
            speaker: request.speaker,
        })
        .await?;
    Ok(Json(StringMessage {
        data: notice.unwrap_or_default(),
    }))
}

/// Recompute the near-sold-out notice.
///
/// # Errors
///
/// - 403 Forbidden: missing or wrong task token
pub async fn set_announcement(
    State(state): State<AppState>,
    _: TaskAuthorized,
) -> Result<Json<StringMessage>, AppError> {
    let notice = state.runner.run(Task::RefreshAnnouncement).await?;
    Ok(Json(StringMessage {
        data: notice.unwrap_or_default(),
    }))
}
