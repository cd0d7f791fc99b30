//! Service-level tests over in-memory collaborators.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Integration tests can use unwrap/expect

use conference_core::announcement::AnnouncementRefresher;
use conference_core::forms::{ProfileMiniForm, SessionForm};
use conference_core::tasks::Task;
use conference_core::types::TeeShirtSize;
use conference_core::{ConferenceError, UserId};
use conference_runtime::RetryPolicy;
use conference_server::app::{ChannelTaskQueue, ConferenceService, TaskRunner, spawn_worker};
use conference_testing::{
    InMemoryAnnouncementCache, InMemoryEntityStore, RecordingEmailProvider, RecordingTaskQueue,
    fixtures,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn service() -> (ConferenceService, InMemoryEntityStore, RecordingTaskQueue) {
    let store = InMemoryEntityStore::new();
    let tasks = RecordingTaskQueue::new();
    let service = ConferenceService::new(
        Arc::new(store.clone()),
        Arc::new(InMemoryAnnouncementCache::new()),
        Arc::new(tasks.clone()),
    )
    .with_retry_policy(RetryPolicy::no_retry());
    (service, store, tasks)
}

#[tokio::test]
async fn saving_a_profile_keeps_untouched_fields() {
    let (service, store, _) = service();
    let ann = fixtures::caller("ann");

    service
        .save_profile(
            &ann,
            ProfileMiniForm {
                display_name: None,
                tee_shirt_size: Some(TeeShirtSize::LW),
            },
        )
        .await
        .unwrap();

    let profile = store.profile_snapshot(&UserId::new("ann")).unwrap();
    assert_eq!(profile.display_name, "ann");
    assert_eq!(profile.tee_shirt_size, TeeShirtSize::LW);
}

#[tokio::test]
async fn enqueue_failures_never_fail_the_request() {
    let (service, store, tasks) = service();
    tasks.fail_enqueues();

    let created = assert_ok!(
        service
            .create_conference(&fixtures::caller("ann"), fixtures::conference_form("RustConf", 10))
            .await
    );

    assert!(created.websafe_key.is_some());
    assert_eq!(store.conference_count(), 1);
}

#[tokio::test]
async fn without_retries_a_lock_race_surfaces_as_a_transaction_conflict() {
    let (service, store, _) = service();
    let key = service
        .create_conference(&fixtures::caller("ann"), fixtures::conference_form("RustConf", 10))
        .await
        .unwrap()
        .websafe_key
        .unwrap();

    store.inject_transaction_conflicts(1);
    let error = assert_err!(
        service
            .register_for_conference(&fixtures::caller("bob"), &key)
            .await
    );
    assert!(matches!(error, ConferenceError::TransactionConflict(_)));

    // The next attempt goes through
    assert!(service
        .register_for_conference(&fixtures::caller("bob"), &key)
        .await
        .unwrap()
        .data);
}

#[tokio::test]
async fn changing_the_speaker_recomputes_the_featured_speaker() {
    let (service, _, tasks) = service();
    let ann = fixtures::caller("ann");
    let conference = service
        .create_conference(&ann, fixtures::conference_form("RustConf", 10))
        .await
        .unwrap()
        .websafe_key
        .unwrap();
    let session = service
        .create_session(&ann, &conference, fixtures::session_form("Macros", "Ferris", "2026-09-10"))
        .await
        .unwrap()
        .websafe_key
        .unwrap();
    tasks.take();

    service
        .update_session(
            &ann,
            &session,
            SessionForm {
                speaker: Some("Corro".to_string()),
                ..SessionForm::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        tasks.tasks(),
        vec![Task::SetFeaturedSpeaker {
            speaker: "Corro".to_string()
        }]
    );
}

#[tokio::test]
async fn deleting_a_session_recomputes_the_featured_speaker() {
    let (service, _, tasks) = service();
    let ann = fixtures::caller("ann");
    let conference = service
        .create_conference(&ann, fixtures::conference_form("RustConf", 10))
        .await
        .unwrap()
        .websafe_key
        .unwrap();
    let session = service
        .create_session(&ann, &conference, fixtures::session_form("Macros", "Ferris", "2026-09-10"))
        .await
        .unwrap()
        .websafe_key
        .unwrap();
    tasks.take();

    assert!(service.delete_session(&ann, &session).await.unwrap().data);

    assert_eq!(
        tasks.tasks(),
        vec![Task::SetFeaturedSpeaker {
            speaker: "Ferris".to_string()
        }]
    );
}

#[tokio::test]
async fn deleted_sessions_drop_out_of_the_wishlist_but_can_still_be_removed() {
    let (service, _, _) = service();
    let ann = fixtures::caller("ann");
    let bob = fixtures::caller("bob");
    let conference = service
        .create_conference(&ann, fixtures::conference_form("RustConf", 10))
        .await
        .unwrap()
        .websafe_key
        .unwrap();
    let session = service
        .create_session(&ann, &conference, fixtures::session_form("Unsafe", "Ferris", "2026-09-10"))
        .await
        .unwrap()
        .websafe_key
        .unwrap();

    assert!(service.add_session_to_wishlist(&bob, &session).await.unwrap().data);
    assert!(service.delete_session(&ann, &session).await.unwrap().data);

    assert!(service
        .get_sessions_in_wishlist(&bob, None)
        .await
        .unwrap()
        .items
        .is_empty());
    assert!(service.delete_session_in_wishlist(&bob, &session).await.unwrap().data);

    let error = assert_err!(service.add_session_to_wishlist(&bob, &session).await);
    assert!(matches!(error, ConferenceError::NotFound { .. }));
}

#[tokio::test]
async fn date_range_is_scoped_to_a_conference_when_given() {
    let (service, _, _) = service();
    let ann = fixtures::caller("ann");
    let mut conferences = Vec::new();
    for name in ["RustConf", "RustFest"] {
        let key = service
            .create_conference(&ann, fixtures::conference_form(name, 10))
            .await
            .unwrap()
            .websafe_key
            .unwrap();
        service
            .create_session(&ann, &key, fixtures::session_form("Talk", "Ferris", "2026-09-10"))
            .await
            .unwrap();
        conferences.push(key);
    }
    service
        .create_session(&ann, &conferences[0], fixtures::session_form("Undated", "Ferris", ""))
        .await
        .unwrap();

    let everywhere = service.get_sessions_in_date_range(None, None, None).await.unwrap();
    assert_eq!(everywhere.items.len(), 2);

    let scoped = service
        .get_sessions_in_date_range(Some(&conferences[1]), Some("2026-09-10"), Some("2026-09-10"))
        .await
        .unwrap();
    assert_eq!(scoped.items.len(), 1);
    assert_eq!(
        scoped.items[0].websafe_conference_key.as_deref(),
        Some(conferences[1].as_str())
    );
}

#[tokio::test]
async fn queued_work_is_drained_by_the_worker() {
    let store = InMemoryEntityStore::new();
    let cache = InMemoryAnnouncementCache::new();
    let email = RecordingEmailProvider::new();
    let (queue, receiver) = ChannelTaskQueue::new(16);
    let runner = TaskRunner::new(
        AnnouncementRefresher::new(Arc::new(store.clone()), Arc::new(cache.clone())),
        Arc::new(email.clone()),
    );
    let worker = spawn_worker(receiver, runner);

    let service = ConferenceService::new(Arc::new(store), Arc::new(cache), Arc::new(queue));
    service
        .create_conference(&fixtures::caller("ann"), fixtures::conference_form("RustConf", 10))
        .await
        .unwrap();
    drop(service);

    tokio::time::timeout(Duration::from_secs(1), worker)
        .await
        .unwrap()
        .unwrap();

    let sent = email.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ann@example.com");
    assert!(sent[0].conference_info.contains("RustConf"));
}
