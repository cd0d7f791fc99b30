//! Prometheus metrics for Conference Central.
//!
//! Metric names live here as constants so the service layer, the task worker
//! and the stores record into the same series.
//!
//! # Example
//!
//! ```rust,no_run
//! use conference_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Rendered by the HTTP layer at /metrics
//! let text = server.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use thiserror::Error;

// Re-export metrics macros for use in other crates
pub use metrics::{counter, histogram};

/// Conferences created.
pub const CONFERENCES_CREATED: &str = "conference_conferences_created_total";
/// Sessions created.
pub const SESSIONS_CREATED: &str = "conference_sessions_created_total";
/// Registration attempts, labelled `action` and `outcome`.
pub const REGISTRATIONS: &str = "conference_registrations_total";
/// Wishlist changes, labelled `action` and `outcome`.
pub const WISHLIST_CHANGES: &str = "conference_wishlist_changes_total";
/// Announcement refreshes, labelled `kind` and `result`.
pub const ANNOUNCEMENT_REFRESHES: &str = "conference_announcement_refresh_total";
/// Background tasks processed, labelled `task` and `result`.
pub const TASKS_PROCESSED: &str = "conference_tasks_processed_total";
/// Transactions retried after a lock conflict.
pub const TRANSACTION_RETRIES: &str = "conference_transaction_retries_total";
/// Registration transaction latency.
pub const TRANSACTION_DURATION: &str = "conference_transaction_duration_seconds";
/// HTTP request latency, labelled `method` and `status`.
pub const HTTP_REQUEST_DURATION: &str = "conference_http_request_duration_seconds";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder plus the handle used to render `/metrics`.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a metrics server for the given advertised address.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Describe every metric and install the Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns an error if the exporter cannot be built or installed. A
    /// recorder that is already installed (tests) is only a warning.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        describe_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Advertised address.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Handle for rendering, once started.
    #[must_use]
    pub fn handle(&self) -> Option<PrometheusHandle> {
        self.handle.clone()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder has not been installed by this server.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn describe_metrics() {
    describe_counter!(CONFERENCES_CREATED, "Total number of conferences created");
    describe_counter!(SESSIONS_CREATED, "Total number of sessions created");
    describe_counter!(
        REGISTRATIONS,
        "Conference registration attempts by action and outcome"
    );
    describe_counter!(
        WISHLIST_CHANGES,
        "Session wishlist changes by action and outcome"
    );
    describe_counter!(
        ANNOUNCEMENT_REFRESHES,
        "Announcement cache refreshes by kind and result"
    );
    describe_counter!(TASKS_PROCESSED, "Background tasks processed by task and result");
    describe_counter!(
        TRANSACTION_RETRIES,
        "Registration transactions retried after a lock conflict"
    );
    describe_histogram!(
        TRANSACTION_DURATION,
        "Time taken by registration transactions, retries included"
    );
    describe_histogram!(HTTP_REQUEST_DURATION, "HTTP request latency by method and status");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_none_before_start() {
        let server = MetricsServer::new(SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert!(server.render().is_none());
        assert_eq!(server.addr().port(), 9090);
    }
}
