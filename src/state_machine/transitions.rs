//! Allowed edges of the two approval workflows.
//!
//! Every transition the state machines execute is looked up here first; a
//! (state, event) or (state, target) pair missing from the table is an
//! invalid transition regardless of who asks.

use super::events::WorkflowEvent;
use super::states::{CourseRunWorkflowState, CourseWorkflowState};

/// A directed edge `(from, event) -> to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge<S> {
    pub from: S,
    pub event: WorkflowEvent,
    pub to: S,
}

const fn edge<S>(from: S, event: WorkflowEvent, to: S) -> Edge<S> {
    Edge { from, event, to }
}

pub const COURSE_EDGES: &[Edge<CourseWorkflowState>] = &[
    edge(
        CourseWorkflowState::Draft,
        WorkflowEvent::SendForReview,
        CourseWorkflowState::Review,
    ),
    edge(
        CourseWorkflowState::Review,
        WorkflowEvent::Reject,
        CourseWorkflowState::Draft,
    ),
    edge(
        CourseWorkflowState::Review,
        WorkflowEvent::Approve,
        CourseWorkflowState::Approved,
    ),
    edge(
        CourseWorkflowState::Approved,
        WorkflowEvent::Reopen,
        CourseWorkflowState::Draft,
    ),
];

pub const COURSE_RUN_EDGES: &[Edge<CourseRunWorkflowState>] = &[
    edge(
        CourseRunWorkflowState::Draft,
        WorkflowEvent::SendForReview,
        CourseRunWorkflowState::Review,
    ),
    edge(
        CourseRunWorkflowState::Review,
        WorkflowEvent::Reject,
        CourseRunWorkflowState::Draft,
    ),
    edge(
        CourseRunWorkflowState::Review,
        WorkflowEvent::Approve,
        CourseRunWorkflowState::Approved,
    ),
    edge(
        CourseRunWorkflowState::Approved,
        WorkflowEvent::Reopen,
        CourseRunWorkflowState::Draft,
    ),
    edge(
        CourseRunWorkflowState::Approved,
        WorkflowEvent::Publish,
        CourseRunWorkflowState::Published,
    ),
    edge(
        CourseRunWorkflowState::Published,
        WorkflowEvent::Reopen,
        CourseRunWorkflowState::Draft,
    ),
];

/// Resolve the target state for `event` fired from `from`
pub fn target_for<S: Copy + PartialEq>(
    edges: &[Edge<S>],
    from: S,
    event: WorkflowEvent,
) -> Option<S> {
    edges
        .iter()
        .find(|e| e.from == from && e.event == event)
        .map(|e| e.to)
}

/// Resolve the event that moves `from` to `to`
pub fn event_for<S: Copy + PartialEq>(edges: &[Edge<S>], from: S, to: S) -> Option<WorkflowEvent> {
    edges
        .iter()
        .find(|e| e.from == from && e.to == to)
        .map(|e| e.event)
}

/// Events that can be fired from `from`
pub fn available_events<S: Copy + PartialEq>(edges: &[Edge<S>], from: S) -> Vec<WorkflowEvent> {
    edges
        .iter()
        .filter(|e| e.from == from)
        .map(|e| e.event)
        .collect()
}
