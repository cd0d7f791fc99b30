//! Application layer: the service operations and the background work they
//! dispatch.

pub mod announcements;
pub mod services;
pub mod tasks;

pub use announcements::spawn_announcement_scheduler;
pub use services::ConferenceService;
pub use tasks::{ChannelTaskQueue, TaskRunner, spawn_worker};
