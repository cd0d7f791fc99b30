//! Health check endpoints.
//!
//! `GET /health` is liveness and never touches dependencies. `GET /ready`
//! runs every registered [`ReadinessProbe`] and answers 503 if any fails.

use axum::{Json, extract::State, http::StatusCode};
use conference_core::environment::Clock;
use conference_core::store::BoxFuture;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A dependency that can report whether it is usable.
pub trait ReadinessProbe: Send + Sync {
    /// Component name shown in the report.
    fn name(&self) -> &'static str;

    /// `Ok` if the component answers, otherwise a short reason.
    fn check(&self) -> BoxFuture<'_, Result<(), String>>;
}

/// Probes plus the clock used to timestamp reports.
#[derive(Clone)]
pub struct Readiness {
    probes: Vec<Arc<dyn ReadinessProbe>>,
    clock: Arc<dyn Clock>,
}

impl Readiness {
    /// Create an empty probe set.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            probes: Vec::new(),
            clock,
        }
    }

    /// Register a probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probes.push(probe);
        self
    }
}

/// Status of one component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentHealth {
    /// Component name
    pub component: String,
    /// Whether it answered
    pub healthy: bool,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `"ready"` or `"unavailable"`
    pub status: String,
    /// Per-component results
    pub components: Vec<ComponentHealth>,
    /// When the probes ran
    pub checked_at: DateTime<Utc>,
}

/// Liveness check.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check.
///
/// # Status Codes
///
/// - 200 OK: every probe passed
/// - 503 Service Unavailable: at least one probe failed
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness_check(State(readiness): State<Readiness>) -> (StatusCode, Json<HealthReport>) {
    let results = join_all(readiness.probes.iter().map(|probe| async move {
        let outcome = probe.check().await;
        if let Err(reason) = &outcome {
            tracing::warn!(component = probe.name(), reason = %reason, "Readiness probe failed");
        }
        ComponentHealth {
            component: probe.name().to_string(),
            healthy: outcome.is_ok(),
            message: outcome.err(),
        }
    }))
    .await;

    let ready = results.iter().all(|c| c.healthy);
    let report = HealthReport {
        status: if ready { "ready" } else { "unavailable" }.to_string(),
        components: results,
        checked_at: readiness.clock.now(),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
