//! HTTP request handlers shared by every service.

pub mod health;

pub use health::{HealthReport, Readiness, ReadinessProbe, health_check, readiness_check};
