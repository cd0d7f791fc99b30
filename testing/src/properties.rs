//! Property-based testing strategies (proptest).

use conference_core::registration::RegistrationAction;
use proptest::prelude::*;

/// One step of a registration script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationStep {
    /// Attendee `index` issues a registration command
    Attendee(usize, RegistrationAction),
    /// The organizer edits the conference capacity
    SetMaxAttendees(i32),
}

/// Any registration command.
pub fn registration_action() -> impl Strategy<Value = RegistrationAction> {
    prop_oneof![
        Just(RegistrationAction::Register),
        Just(RegistrationAction::Unregister),
    ]
}

/// Attendee commands over `attendees` attendees, mixed with the occasional
/// capacity edit to anything in `0..=max_capacity`.
pub fn registration_step(attendees: usize, max_capacity: i32) -> impl Strategy<Value = RegistrationStep> {
    prop_oneof![
        4 => (0..attendees, registration_action())
            .prop_map(|(who, action)| RegistrationStep::Attendee(who, action)),
        1 => (0..=max_capacity).prop_map(RegistrationStep::SetMaxAttendees),
    ]
}

/// A sequence of registration steps.
pub fn registration_script(
    attendees: usize,
    max_capacity: i32,
    max_len: usize,
) -> impl Strategy<Value = Vec<RegistrationStep>> {
    prop::collection::vec(registration_step(attendees, max_capacity), 0..max_len)
}
