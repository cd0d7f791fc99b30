//! Application state for the Conference Central HTTP server.
//!
//! Contains the shared resources needed by handlers:
//! - Conference service (all API operations)
//! - Authenticator (bearer token resolution)
//! - Task runner and task token (internal `/tasks` and `/crons` endpoints)
//! - Readiness probes and the Prometheus handle

use crate::app::{ConferenceService, TaskRunner};
use crate::auth::Authenticator;
use axum::extract::FromRef;
use conference_web::handlers::health::Readiness;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Conference, session, profile and wishlist operations
    pub service: Arc<ConferenceService>,

    /// Resolves bearer tokens to callers
    pub authenticator: Arc<Authenticator>,

    /// Runs tasks triggered through the internal endpoints
    pub runner: TaskRunner,

    /// Shared secret for the internal endpoints; `None` disables them
    pub task_token: Option<Arc<str>>,

    /// Dependency probes for `/ready`
    pub readiness: Readiness,

    /// Prometheus recorder handle for `/metrics`
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        service: Arc<ConferenceService>,
        authenticator: Arc<Authenticator>,
        runner: TaskRunner,
        readiness: Readiness,
    ) -> Self {
        Self {
            service,
            authenticator,
            runner,
            task_token: None,
            readiness,
            metrics: None,
        }
    }

    /// Enable the internal endpoints behind `token`.
    #[must_use]
    pub fn with_task_token(mut self, token: Option<String>) -> Self {
        self.task_token = token.map(Arc::from);
        self
    }

    /// Serve `/metrics` from `handle`.
    #[must_use]
    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

impl FromRef<AppState> for Readiness {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.readiness.clone()
    }
}
