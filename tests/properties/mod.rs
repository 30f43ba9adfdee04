use course_publisher::constants::ReviewSides;
use course_publisher::models::PublisherUserRole;
use course_publisher::state_machine::guards::acting_role;
use course_publisher::state_machine::transitions::{event_for, target_for};
use course_publisher::state_machine::{
    CourseRunWorkflowState, CourseWorkflowState, WorkflowEvent, COURSE_EDGES, COURSE_RUN_EDGES,
};
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

fn course_state() -> impl Strategy<Value = CourseWorkflowState> {
    select(CourseWorkflowState::ALL.to_vec())
}

fn run_state() -> impl Strategy<Value = CourseRunWorkflowState> {
    select(CourseRunWorkflowState::ALL.to_vec())
}

fn event() -> impl Strategy<Value = WorkflowEvent> {
    select(WorkflowEvent::ALL.to_vec())
}

fn held_roles() -> impl Strategy<Value = Vec<PublisherUserRole>> {
    subsequence(PublisherUserRole::ALL.to_vec(), 0..=PublisherUserRole::ALL.len())
}

proptest! {
    /// Property: a course event resolves to the table target or to nothing
    #[test]
    fn course_events_follow_edges(from in course_state(), event in event()) {
        let expected = COURSE_EDGES
            .iter()
            .find(|e| e.from == from && e.event == event)
            .map(|e| e.to);
        prop_assert_eq!(target_for(COURSE_EDGES, from, event), expected);
    }

    /// Property: a run target is reachable only through a listed edge, and the
    /// resolved event leads back to that target
    #[test]
    fn run_targets_round_trip_through_events(from in run_state(), to in run_state()) {
        match event_for(COURSE_RUN_EDGES, from, to) {
            Some(event) => prop_assert_eq!(target_for(COURSE_RUN_EDGES, from, event), Some(to)),
            None => prop_assert!(!COURSE_RUN_EDGES.iter().any(|e| e.from == from && e.to == to)),
        }
    }

    /// Property: no state has an edge to itself
    #[test]
    fn no_self_transitions(from in run_state(), event in event()) {
        prop_assert_ne!(target_for(COURSE_RUN_EDGES, from, event), Some(from));
    }

    /// Property: only holders of the publishing role may publish
    #[test]
    fn publishing_requires_publisher(
        held in held_roles(),
        owner in select(PublisherUserRole::ALL.to_vec()),
    ) {
        let role = acting_role(
            WorkflowEvent::Publish,
            ReviewSides::COURSE_RUN,
            owner,
            &[PublisherUserRole::Publisher],
            &held,
        );
        prop_assert_eq!(role.is_some(), held.contains(&PublisherUserRole::Publisher));
    }

    /// Property: the acting role is always one the user actually holds
    #[test]
    fn acting_role_is_held(
        held in held_roles(),
        owner in select(PublisherUserRole::ALL.to_vec()),
        event in event(),
    ) {
        let overrides = [PublisherUserRole::Publisher];
        if let Some(role) = acting_role(event, ReviewSides::COURSE, owner, &overrides, &held) {
            prop_assert!(held.contains(&role));
        }
    }
}
