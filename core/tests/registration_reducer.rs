//! Registration and wishlist reducer tests.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use conference_core::effect::Effect;
use conference_core::forms::ConferenceForm;
use conference_core::mapper;
use conference_core::registration::{
    RegistrationAction, RegistrationEnvironment, RegistrationReducer, RegistrationState,
    WishlistAction, WishlistReducer, WishlistState,
};
use conference_core::tasks::Task;
use conference_core::{
    Conference, ConferenceError, ConferenceId, ConferenceKey, ConflictReason, Profile, SessionId,
    SessionKey, TeeShirtSize, UserId,
};
use conference_testing::properties::{RegistrationStep, registration_script};
use conference_testing::{RecordingTaskQueue, ReducerTest, assertions};
use proptest::prelude::*;
use std::sync::Arc;

fn profile(id: &str) -> Profile {
    Profile {
        user_id: UserId::new(id),
        display_name: id.to_string(),
        main_email: format!("{id}@example.com"),
        tee_shirt_size: TeeShirtSize::NotSpecified,
        conference_keys_to_attend: Vec::new(),
        session_keys_wishlist: Vec::new(),
    }
}

fn conference(max: i32, seats: i32) -> Conference {
    Conference {
        key: ConferenceKey::new(UserId::new("organizer"), ConferenceId::new(1)),
        name: "RustConf".into(),
        description: None,
        topics: vec!["Rust".into()],
        city: "Portland".into(),
        start_date: None,
        end_date: None,
        month: 0,
        max_attendees: max,
        seats_available: seats,
    }
}

fn env() -> (RegistrationEnvironment, RecordingTaskQueue) {
    let queue = RecordingTaskQueue::new();
    (RegistrationEnvironment::new(Arc::new(queue.clone())), queue)
}

#[test]
fn register_takes_a_seat() {
    let (env, _) = env();
    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(profile("ann"), conference(100, 100)))
        .when_action(RegistrationAction::Register)
        .then_state(|state| {
            assert_eq!(state.outcome, Some(Ok(true)));
            assert_eq!(state.conference.seats_available, 99);
            assert_eq!(state.profile.conference_keys_to_attend, vec![state.conference.key.clone()]);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn second_register_is_a_conflict_and_changes_nothing() {
    let (env, _) = env();
    let mut attending = profile("ann");
    attending.conference_keys_to_attend.push(conference(10, 9).key);

    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(attending.clone(), conference(10, 9)))
        .when_action(RegistrationAction::Register)
        .then_state(move |state| {
            assert_eq!(
                state.outcome,
                Some(Err(ConferenceError::Conflict(ConflictReason::AlreadyRegistered)))
            );
            assert_eq!(state.conference.seats_available, 9);
            assert_eq!(state.profile, attending);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn register_without_seats_is_a_conflict() {
    let (env, _) = env();
    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(profile("ann"), conference(10, 0)))
        .when_action(RegistrationAction::Register)
        .then_state(|state| {
            assert_eq!(
                state.outcome,
                Some(Err(ConferenceError::Conflict(ConflictReason::SeatsExhausted)))
            );
            assert_eq!(state.conference.seats_available, 0);
            assert!(state.profile.conference_keys_to_attend.is_empty());
        })
        .run();
}

#[test]
fn register_then_unregister_restores_seats() {
    let (env, _) = env();
    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(profile("ann"), conference(50, 42)))
        .when_action(RegistrationAction::Register)
        .when_action(RegistrationAction::Unregister)
        .then_state(|state| {
            assert_eq!(state.outcome, Some(Ok(true)));
            assert_eq!(state.conference.seats_available, 42);
            assert!(state.profile.conference_keys_to_attend.is_empty());
        })
        .run();
}

#[test]
fn unregister_never_frees_more_than_capacity() {
    let (env, _) = env();
    let mut attending = profile("ann");
    attending.conference_keys_to_attend.push(conference(3, 3).key);

    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(attending, conference(3, 3)))
        .when_action(RegistrationAction::Unregister)
        .then_state(|state| {
            assert_eq!(state.outcome, Some(Ok(true)));
            assert_eq!(state.conference.seats_available, 3);
            assert!(state.profile.conference_keys_to_attend.is_empty());
        })
        .run();
}

#[test]
fn unregister_when_not_registered_is_false() {
    let (env, _) = env();
    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(profile("ann"), conference(10, 10)))
        .when_action(RegistrationAction::Unregister)
        .then_state(|state| {
            assert_eq!(state.outcome, Some(Ok(false)));
            assert_eq!(state.conference.seats_available, 10);
        })
        .then_effects(assertions::assert_no_effects)
        .run();
}

#[test]
fn entering_the_sold_out_window_requests_a_refresh() {
    let (env, _) = env();
    ReducerTest::new(RegistrationReducer)
        .with_env(env)
        .given_state(RegistrationState::new(profile("ann"), conference(10, 6)))
        .when_action(RegistrationAction::Register)
        .then_effects(|effects| {
            assertions::assert_effects_count(effects, 1);
            assertions::assert_has_future_effect(effects);
        })
        .run();
}

#[tokio::test]
async fn refresh_effect_enqueues_a_task() {
    let (env, queue) = env();
    let mut state = RegistrationState::new(profile("ann"), conference(10, 1));

    let (outcome, effects) =
        RegistrationReducer.transition(&mut state, RegistrationAction::Register, &env);
    assert_eq!(outcome, Ok(true));
    assert_eq!(state.conference.seats_available, 0);

    for effect in effects {
        if let Effect::Future(future) = effect {
            assert!(future.await.is_none());
        }
    }
    assert_eq!(queue.tasks(), vec![Task::RefreshAnnouncement]);
}

#[tokio::test]
async fn refresh_failures_are_swallowed() {
    let (env, queue) = env();
    queue.fail_enqueues();
    let mut state = RegistrationState::new(profile("ann"), conference(10, 3));

    let (outcome, effects) =
        RegistrationReducer.transition(&mut state, RegistrationAction::Register, &env);
    assert_eq!(outcome, Ok(true));
    for effect in effects {
        if let Effect::Future(future) = effect {
            assert!(future.await.is_none());
        }
    }
    assert!(queue.tasks().is_empty());
}

fn session_key(id: i64) -> SessionKey {
    SessionKey::new(conference(1, 1).key, SessionId::new(id))
}

#[test]
fn wishlist_add_and_duplicate() {
    ReducerTest::new(WishlistReducer)
        .with_env(())
        .given_state(WishlistState::new(profile("ann")))
        .when_action(WishlistAction::Add(session_key(1)))
        .when_action(WishlistAction::Add(session_key(1)))
        .then_state(|state| {
            assert_eq!(
                state.outcome,
                Some(Err(ConferenceError::Conflict(ConflictReason::AlreadyWishlisted)))
            );
            assert_eq!(state.profile.session_keys_wishlist, vec![session_key(1)]);
        })
        .run();
}

#[test]
fn wishlist_remove_reports_membership() {
    let mut ann = profile("ann");
    assert_eq!(WishlistReducer.apply(&mut ann, WishlistAction::Remove(session_key(1))), Ok(false));
    assert_eq!(WishlistReducer.apply(&mut ann, WishlistAction::Add(session_key(1))), Ok(true));
    assert_eq!(WishlistReducer.apply(&mut ann, WishlistAction::Add(session_key(2))), Ok(true));
    assert_eq!(WishlistReducer.apply(&mut ann, WishlistAction::Remove(session_key(1))), Ok(true));
    assert_eq!(ann.session_keys_wishlist, vec![session_key(2)]);
}

#[test]
fn failed_wishlist_add_leaves_profile_untouched() {
    let mut ann = profile("ann");
    ann.session_keys_wishlist.push(session_key(1));
    let before = ann.clone();

    assert!(WishlistReducer.apply(&mut ann, WishlistAction::Add(session_key(1))).is_err());
    assert_eq!(ann, before);
}

proptest! {
    #[test]
    fn seats_stay_within_capacity(max in 0..8i32, script in registration_script(6, 8, 40)) {
        let (env, _) = env();
        let mut conf = conference(max, max);
        let mut profiles: Vec<Profile> = (0..6).map(|i| profile(&format!("user{i}"))).collect();

        for step in script {
            match step {
                RegistrationStep::Attendee(who, action) => {
                    let mut state = RegistrationState::new(profiles[who].clone(), conf.clone());
                    let (outcome, _) = RegistrationReducer.transition(&mut state, action, &env);
                    if outcome.is_ok() {
                        profiles[who] = state.profile;
                        conf = state.conference;
                    }
                },
                RegistrationStep::SetMaxAttendees(capacity) => {
                    let form = ConferenceForm {
                        max_attendees: Some(capacity),
                        ..ConferenceForm::default()
                    };
                    let mut edited = conf.clone();
                    if mapper::apply_conference_update(&mut edited, &form).is_ok() {
                        conf = edited;
                    } else {
                        prop_assert_eq!(&edited, &conf);
                    }
                },
            }

            prop_assert!(conf.seats_available >= 0);
            prop_assert!(conf.seats_available <= conf.max_attendees);
            let attending = profiles.iter().filter(|p| p.is_attending(&conf.key)).count();
            prop_assert_eq!(i64::from(conf.max_attendees - conf.seats_available), attending as i64);
        }
    }
}
