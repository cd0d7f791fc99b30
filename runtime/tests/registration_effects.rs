//! Registration effects executed after commit.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use conference_core::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationState,
};
use conference_core::tasks::Task;
use conference_core::mapper;
use conference_runtime::EffectExecutor;
use conference_testing::{RecordingTaskQueue, fixtures};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn sold_out_window_enqueues_refresh_after_execution() {
    let queue = RecordingTaskQueue::new();
    let env = RegistrationEnvironment::new(Arc::new(queue.clone()));
    let executor = EffectExecutor::<RegistrationAction>::new();

    let organizer = fixtures::caller("organizer");
    let mut form = fixtures::conference_form("RustConf", 6);
    let conference = mapper::new_conference(&mut form, &organizer)
        .unwrap()
        .into_conference(conference_core::ConferenceId::new(1));

    let mut state =
        RegistrationState::new(mapper::new_profile(&fixtures::caller("ann")), conference);

    let (outcome, effects) =
        RegistrationReducer.transition(&mut state, RegistrationAction::Register, &env);
    assert_eq!(outcome, Ok(true));
    assert_eq!(state.conference.seats_available, 5);

    executor.execute_all(effects);
    assert!(executor.wait_idle(Duration::from_secs(2)).await);
    assert_eq!(queue.tasks(), vec![Task::RefreshAnnouncement]);
}

#[tokio::test]
async fn registration_far_from_sold_out_spawns_nothing() {
    let queue = RecordingTaskQueue::new();
    let env = RegistrationEnvironment::new(Arc::new(queue.clone()));
    let executor = EffectExecutor::<RegistrationAction>::new();

    let mut form = fixtures::conference_form("RustConf", 100);
    let conference = mapper::new_conference(&mut form, &fixtures::caller("organizer"))
        .unwrap()
        .into_conference(conference_core::ConferenceId::new(1));
    let mut state =
        RegistrationState::new(mapper::new_profile(&fixtures::caller("ann")), conference);

    let (_, effects) =
        RegistrationReducer.transition(&mut state, RegistrationAction::Register, &env);
    executor.execute_all(effects);

    assert_eq!(executor.pending(), 0);
    assert!(queue.tasks().is_empty());
}
