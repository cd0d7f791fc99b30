//! HTTP handlers for the Conference Central API.
//!
//! Every handler delegates to [`crate::app::ConferenceService`]; error
//! mapping happens in [`conference_web::AppError`].

pub mod announcements;
pub mod conferences;
pub mod profiles;
pub mod sessions;
pub mod tasks;
pub mod wishlist;
