//! Router configuration for Conference Central.
//!
//! Builds the complete Axum router with all endpoints.

use super::state::AppState;
use crate::api::{announcements, conferences, profiles, sessions, tasks, wishlist};
use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use conference_web::handlers::health::{health_check, readiness_check};
use conference_web::track_request;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `/api/v1/*`: the public API
/// - `/tasks/*`, `/crons/*`: internal triggers behind `X-Task-Token`
/// - `/health`, `/ready`, `/metrics`: operations
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Profiles
        .route("/profile", get(profiles::get_profile).post(profiles::save_profile))
        // Conferences
        .route("/conference", post(conferences::create_conference))
        .route(
            "/conference/:websafeConferenceKey",
            get(conferences::get_conference).put(conferences::update_conference),
        )
        .route("/conferences/created", get(conferences::get_conferences_created))
        .route("/conferences/attending", get(conferences::get_conferences_to_attend))
        .route("/queryConferences", post(conferences::query_conferences))
        .route(
            "/conference/:websafeConferenceKey/registration",
            post(conferences::register_for_conference)
                .delete(conferences::unregister_from_conference),
        )
        .route("/conference/announcement/get", get(announcements::get_announcement))
        // Sessions
        .route(
            "/conference/:websafeConferenceKey/sessions",
            get(sessions::get_conference_sessions).post(sessions::create_session),
        )
        .route(
            "/conference/:websafeConferenceKey/sessions/:typeOfSession",
            get(sessions::get_conference_sessions_by_type),
        )
        .route(
            "/session/:websafeSessionKey",
            get(sessions::get_session)
                .put(sessions::update_session)
                .delete(sessions::delete_session),
        )
        .route("/sessions/speaker/:speaker", get(sessions::get_sessions_by_speaker))
        .route("/sessions", get(sessions::get_sessions_in_date_range))
        .route("/session/speaker/get", get(announcements::get_featured_speaker))
        // Wishlist
        .route(
            "/session/wishlist/:websafeSessionKey",
            post(wishlist::add_session_to_wishlist).delete(wishlist::delete_session_in_wishlist),
        )
        .route("/session/attending", get(wishlist::get_sessions_in_wishlist));

    let task_routes = Router::new()
        .route("/tasks/send_confirmation_email", post(tasks::send_confirmation_email))
        .route("/tasks/set_featured_speaker", post(tasks::set_featured_speaker))
        .route("/crons/set_announcement", get(tasks::set_announcement));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(render_metrics))
        .nest("/api/v1", api_routes)
        .merge(task_routes)
        .with_state(state)
        .layer(middleware::from_fn(track_request))
        .layer(TraceLayer::new_for_http())
}

/// Prometheus text exposition.
///
/// 503 when no recorder is installed.
#[allow(clippy::unused_async)]
async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed").into_response(),
    }
}

