//! Conference Central - conference organization and attendance service
//!
//! Organizers create conferences and sessions; attendees keep a profile,
//! register for conferences (one seat each) and keep a session wishlist.
//! Two cached announcements (near sold out, featured speaker) are refreshed
//! in the background.
//!
//! # Architecture
//!
//! ```text
//!   HTTP (axum) ──► api::* handlers ──► app::ConferenceService
//!                                           │
//!            ┌──────────────────────────────┼─────────────────────────┐
//!            ▼                              ▼                         ▼
//!   PostgresEntityStore           RedisAnnouncementCache        ChannelTaskQueue
//!   (profiles, conferences,       (announcement notices)              │
//!    sessions, registration                                           ▼
//!    transactions)                                          task worker + scheduler
//!                                                           (email, announcements)
//! ```
//!
//! Registration is a reducer (`conference_core::registration`) evaluated
//! inside a store transaction that locks the profile and the conference;
//! its effects run only after commit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod email;
pub mod server;

pub use app::{ChannelTaskQueue, ConferenceService, TaskRunner};
pub use config::Config;
pub use server::{AppState, build_router};
