//! Periodic near-sold-out announcement refresh.

use super::tasks::TaskRunner;
use conference_core::tasks::Task;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh the near-sold-out notice every `period`, starting immediately.
///
/// Runs until the returned handle is aborted. A failed refresh is logged
/// and retried on the next tick.
pub fn spawn_announcement_scheduler(runner: TaskRunner, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_secs = period.as_secs(), "Announcement scheduler started");

        loop {
            interval.tick().await;
            if let Err(error) = runner.run(Task::RefreshAnnouncement).await {
                tracing::warn!(error = %error, "Scheduled announcement refresh failed");
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use conference_core::announcement::{AnnouncementRefresher, RECENT_ANNOUNCEMENTS_KEY};
    use conference_core::mapper;
    use conference_core::store::EntityStore;
    use conference_testing::{
        InMemoryAnnouncementCache, InMemoryEntityStore, RecordingEmailProvider, fixtures,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn first_tick_refreshes_immediately() {
        let store = InMemoryEntityStore::new();
        let cache = InMemoryAnnouncementCache::new();
        let mut form = fixtures::conference_form("LastCall", 2);
        store
            .insert_conference(mapper::new_conference(&mut form, &fixtures::caller("org")).unwrap())
            .await
            .unwrap();

        let refresher = AnnouncementRefresher::new(Arc::new(store), Arc::new(cache.clone()));
        let runner = TaskRunner::new(refresher, Arc::new(RecordingEmailProvider::new()));
        let handle = spawn_announcement_scheduler(runner, Duration::from_secs(3600));

        let mut notice = None;
        for _ in 0..100 {
            notice = cache.value(RECENT_ANNOUNCEMENTS_KEY);
            if notice.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(
            notice.as_deref(),
            Some("Last chance to attend! The following conferences are nearly sold out: LastCall")
        );
    }
}
