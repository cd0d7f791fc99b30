//! Background tasks dispatched fire-and-forget through a [`crate::store::TaskQueue`].

use serde::{Deserialize, Serialize};

/// A unit of background work.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Tell an organizer their conference was created.
    SendConfirmationEmail {
        /// Recipient
        email: String,
        /// Human-readable dump of the created conference
        conference_info: String,
    },
    /// Recompute the featured-speaker notice for `speaker`.
    SetFeaturedSpeaker {
        /// Speaker whose sessions are counted
        speaker: String,
    },
    /// Recompute the near-sold-out notice.
    RefreshAnnouncement,
}

impl Task {
    /// Short name used in logs and metric labels.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SendConfirmationEmail { .. } => "send_confirmation_email",
            Self::SetFeaturedSpeaker { .. } => "set_featured_speaker",
            Self::RefreshAnnouncement => "refresh_announcement",
        }
    }
}
