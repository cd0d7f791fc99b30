//! Axum integration for Conference Central.
//!
//! The HTTP shell around the domain crates:
//!
//! - [`AppError`]: domain errors mapped to status codes and JSON bodies
//! - [`CorrelationId`] and [`BearerToken`] extractors
//! - [`middleware::track_request`]: correlation ids, request spans, latency
//! - health and readiness handlers
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract** the caller, path keys and JSON form
//! 3. **Call** the service operation
//! 4. **Map** the result (or `ConferenceError`) to an HTTP response

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::{AppError, ErrorBody};
pub use extractors::{BearerToken, CorrelationId};
pub use middleware::{CORRELATION_ID_HEADER, track_request};
