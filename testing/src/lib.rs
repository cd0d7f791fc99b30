//! # Conference Central Testing
//!
//! Testing utilities for Conference Central.
//!
//! This crate provides:
//! - In-memory implementations of the entity store, announcement cache and task queue
//! - Identity and email provider doubles
//! - A Given-When-Then harness for reducers
//! - Fixtures for callers and request forms
//!
//! ## Example
//!
//! ```ignore
//! use conference_testing::{InMemoryEntityStore, RecordingTaskQueue, fixtures};
//!
//! #[tokio::test]
//! async fn registration_takes_a_seat() {
//!     let store = Arc::new(InMemoryEntityStore::new());
//!     let service = ConferenceService::new(store.clone(), cache, Arc::new(RecordingTaskQueue::new()));
//!
//!     let form = service.create_conference(&fixtures::caller("org"), fixtures::conference_form("RustConf", 10)).await?;
//!     service.register_for_conference(&fixtures::caller("ann"), form.websafe_key.as_deref().unwrap()).await?;
//! }
//! ```

pub mod fixtures;
pub mod mocks;
pub mod properties;
pub mod reducer_test;

pub use mocks::{
    FixedClock, InMemoryAnnouncementCache, InMemoryEntityStore, RecordingEmailProvider,
    RecordingTaskQueue, SentEmail, StaticIdentityProvider, test_clock,
};
pub use reducer_test::{ReducerTest, assertions};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use conference_core::environment::Clock;
    use conference_core::mapper;
    use conference_core::store::{AnnouncementCache, EntityStore, TaskQueue};
    use conference_core::tasks::Task;
    use futures::StreamExt;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
    }

    #[tokio::test]
    async fn conference_keys_must_match_organizer() {
        let store = InMemoryEntityStore::new();
        let mut form = fixtures::conference_form("RustConf", 10);
        let new = mapper::new_conference(&mut form, &fixtures::caller("org")).unwrap();
        let stored = store.insert_conference(new).await.unwrap();

        assert!(store.get_conference(stored.key.clone()).await.unwrap().is_some());

        let mut forged = stored.key.clone();
        forged.organizer = conference_core::UserId::new("someone-else");
        assert!(store.get_conference(forged).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_stream_is_ordered() {
        let store = InMemoryEntityStore::new();
        for name in ["Gamma", "Alpha", "Beta"] {
            let mut form = fixtures::conference_form(name, 10);
            let new = mapper::new_conference(&mut form, &fixtures::caller("org")).unwrap();
            store.insert_conference(new).await.unwrap();
        }

        let names: Vec<String> = store
            .query_conferences(conference_core::filter::ConferenceQuery::all())
            .map(|c| c.unwrap().name)
            .collect()
            .await;
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);
    }

    #[tokio::test]
    async fn cache_and_queue_record_writes() {
        let cache = InMemoryAnnouncementCache::new();
        cache.set("K", "v".into()).await.unwrap();
        assert_eq!(cache.value("K").as_deref(), Some("v"));
        cache.delete("K").await.unwrap();
        assert_eq!(cache.get("K").await.unwrap(), None);

        let queue = RecordingTaskQueue::new();
        queue.enqueue(Task::RefreshAnnouncement).await.unwrap();
        assert_eq!(queue.take(), vec![Task::RefreshAnnouncement]);
        queue.fail_enqueues();
        assert!(queue.enqueue(Task::RefreshAnnouncement).await.is_err());
    }

    #[tokio::test]
    async fn identity_and_email_doubles() {
        use conference_core::providers::{EmailProvider, IdentityProvider};

        let identity = StaticIdentityProvider::new().with_token("t-ann", fixtures::caller("ann"));
        assert_eq!(identity.resolve("t-ann").await.unwrap(), Some(fixtures::caller("ann")));
        assert_eq!(identity.resolve("t-bob").await.unwrap(), None);

        let email = RecordingEmailProvider::new();
        email.send_conference_confirmation("ann@example.com", "RustConf").await.unwrap();
        assert_eq!(
            email.sent(),
            vec![SentEmail {
                to: "ann@example.com".into(),
                conference_info: "RustConf".into(),
            }]
        );
    }
}
