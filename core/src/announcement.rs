//! Announcement notices and the cache refresher.
//!
//! The notice text is a pure function of entity snapshots. The refresher
//! reads the snapshots from the [`EntityStore`] (no transaction; a stale read
//! is fine) and overwrites or clears the cached value.

use crate::error::Result;
use crate::store::{AnnouncementCache, EntityStore};
use crate::types::{Conference, Session};
use std::sync::Arc;

/// Cache key of the near-sold-out notice.
pub const RECENT_ANNOUNCEMENTS_KEY: &str = "RECENT_ANNOUNCEMENTS";

/// Cache key of the featured-speaker notice.
pub const FEATURED_SPEAKERS_KEY: &str = "FEATURED_SPEAKERS";

/// Upper bound (inclusive) of the near-sold-out window.
pub const NEARLY_SOLD_OUT_SEATS: i32 = 5;

/// Minimum number of sessions for a speaker to be featured.
pub const FEATURED_SPEAKER_MIN_SESSIONS: usize = 2;

/// Whether a conference with `seats` left belongs in the near-sold-out notice.
#[must_use]
pub const fn is_nearly_sold_out(seats: i32) -> bool {
    seats > 0 && seats <= NEARLY_SOLD_OUT_SEATS
}

/// Notice listing the conferences that are nearly sold out, if any.
///
/// Conferences outside the window are ignored; names are listed
/// alphabetically.
#[must_use]
pub fn nearly_sold_out_announcement(conferences: &[Conference]) -> Option<String> {
    let mut names: Vec<&str> = conferences
        .iter()
        .filter(|c| is_nearly_sold_out(c.seats_available))
        .map(|c| c.name.as_str())
        .collect();
    if names.is_empty() {
        return None;
    }
    names.sort_unstable();

    Some(format!(
        "Last chance to attend! The following conferences are nearly sold out: {}",
        names.join(", ")
    ))
}

/// Notice featuring `speaker`, if they give at least two sessions.
#[must_use]
pub fn featured_speaker_announcement(speaker: &str, sessions: &[Session]) -> Option<String> {
    let names: Vec<&str> = sessions
        .iter()
        .filter(|s| s.speaker == speaker)
        .map(|s| s.name.as_str())
        .collect();
    if names.len() < FEATURED_SPEAKER_MIN_SESSIONS {
        return None;
    }

    Some(format!(
        "Featured speaker: {speaker} has the following sessions: {}",
        names.join(", ")
    ))
}

/// Recomputes announcement notices and writes them to the cache.
#[derive(Clone)]
pub struct AnnouncementRefresher {
    store: Arc<dyn EntityStore>,
    cache: Arc<dyn AnnouncementCache>,
}

impl AnnouncementRefresher {
    /// Create a refresher over the given store and cache.
    #[must_use]
    pub fn new(store: Arc<dyn EntityStore>, cache: Arc<dyn AnnouncementCache>) -> Self {
        Self { store, cache }
    }

    /// Recompute the near-sold-out notice. Returns the stored value, or `None`
    /// if the entry was cleared.
    ///
    /// # Errors
    ///
    /// Propagates store and cache failures.
    pub async fn refresh_nearly_sold_out(&self) -> Result<Option<String>> {
        let conferences = self
            .store
            .conferences_with_seats_between(1, NEARLY_SOLD_OUT_SEATS)
            .await?;
        let notice = nearly_sold_out_announcement(&conferences);
        self.write(RECENT_ANNOUNCEMENTS_KEY, notice.clone()).await?;

        tracing::debug!(
            conferences = conferences.len(),
            cleared = notice.is_none(),
            "Refreshed near-sold-out announcement"
        );
        Ok(notice)
    }

    /// Recompute the featured-speaker notice for `speaker`.
    ///
    /// # Errors
    ///
    /// Propagates store and cache failures.
    pub async fn refresh_featured_speaker(&self, speaker: &str) -> Result<Option<String>> {
        let sessions = self.store.sessions_by_speaker(speaker.to_string()).await?;
        let notice = featured_speaker_announcement(speaker, &sessions);
        self.write(FEATURED_SPEAKERS_KEY, notice.clone()).await?;

        tracing::debug!(
            speaker,
            sessions = sessions.len(),
            cleared = notice.is_none(),
            "Refreshed featured-speaker announcement"
        );
        Ok(notice)
    }

    /// Current value of a notice, `""` when absent.
    ///
    /// # Errors
    ///
    /// Propagates cache failures.
    pub async fn read(&self, key: &'static str) -> Result<String> {
        Ok(self.cache.get(key).await?.unwrap_or_default())
    }

    async fn write(&self, key: &'static str, notice: Option<String>) -> Result<()> {
        match notice {
            Some(value) => self.cache.set(key, value).await,
            None => self.cache.delete(key).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::key::{ConferenceKey, SessionKey};
    use crate::types::{ConferenceId, SessionId, UserId};

    fn conference(name: &str, seats: i32) -> Conference {
        Conference {
            key: ConferenceKey::new(UserId::new("org"), ConferenceId::new(i64::from(seats))),
            name: name.into(),
            description: None,
            topics: Vec::new(),
            city: "X".into(),
            start_date: None,
            end_date: None,
            month: 0,
            max_attendees: 10,
            seats_available: seats,
        }
    }

    fn session(name: &str, speaker: &str) -> Session {
        let conference = ConferenceKey::new(UserId::new("org"), ConferenceId::new(1));
        Session {
            key: SessionKey::new(conference, SessionId::new(1)),
            name: name.into(),
            highlights: None,
            speaker: speaker.into(),
            duration: 60,
            type_of_session: Vec::new(),
            date: None,
            start_time: None,
        }
    }

    #[test]
    fn lists_only_conferences_inside_the_window() {
        let conferences = vec![
            conference("Zero", 0),
            conference("One", 1),
            conference("Five", 5),
            conference("Six", 6),
        ];
        assert_eq!(
            nearly_sold_out_announcement(&conferences).as_deref(),
            Some("Last chance to attend! The following conferences are nearly sold out: Five, One")
        );
    }

    #[test]
    fn no_nearly_sold_out_conferences_means_no_notice() {
        assert_eq!(nearly_sold_out_announcement(&[conference("Six", 6)]), None);
        assert_eq!(nearly_sold_out_announcement(&[]), None);
    }

    #[test]
    fn speaker_needs_two_sessions() {
        assert_eq!(featured_speaker_announcement("Ferris", &[session("Ownership", "Ferris")]), None);

        let sessions = vec![session("Ownership", "Ferris"), session("Lifetimes", "Ferris")];
        assert_eq!(
            featured_speaker_announcement("Ferris", &sessions).as_deref(),
            Some("Featured speaker: Ferris has the following sessions: Ownership, Lifetimes")
        );
    }

    #[test]
    fn window_bounds() {
        assert!(!is_nearly_sold_out(0));
        assert!(is_nearly_sold_out(1));
        assert!(is_nearly_sold_out(5));
        assert!(!is_nearly_sold_out(6));
    }
}
