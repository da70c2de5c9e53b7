// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Case and queue event handlers.
//!
//! Each handler inspects the current aggregate and an event and returns the
//! delta to apply, or `None` when the event does not concern this thread.
//! They run inside [`ThreadCell::update_if`](crate::aggregate::ThreadCell::update_if),
//! so the aggregate cannot change between the check and the write.

use livechat_core::events::{
    EventCaseInboxAssigneeChanged, EventCaseStatusChanged, EventSetPositionInQueue,
    EventThreadRecovered,
};
use livechat_core::{ChatThread, CustomField, FieldMap, FieldPolicy, ThreadState};
use tracing::debug;

use crate::aggregate::ThreadDelta;
use crate::reconciler::merge_messages;

/// Merges `incoming` into `current`, keeping only allowed ids. Incoming
/// values replace existing ones with the same id.
pub fn merge_fields<'a>(
    current: &FieldMap,
    incoming: impl IntoIterator<Item = &'a CustomField>,
    policy: &dyn FieldPolicy,
) -> FieldMap {
    let mut merged = current.clone();
    for field in incoming {
        if policy.allows_field_id(&field.id) {
            merged.insert(field.id.clone(), field.clone());
        }
    }
    merged
}

/// Queue position update: records the contact and the wait-line position.
pub fn queue_position(thread: &ChatThread, event: &EventSetPositionInQueue) -> Option<ThreadDelta> {
    if thread.state == ThreadState::Closed {
        debug!(thread_id = %thread.id, "ignoring queue position for closed thread");
        return None;
    }
    Some(
        ThreadDelta::new()
            .contact_id(Some(event.consumer_contact.clone()))
            .position_in_queue(Some(event.position_in_queue))
            .has_online_agent(event.has_online_agent),
    )
}

/// An agent inbox took the case: the thread becomes live.
pub fn assignee_changed(
    thread: &ChatThread,
    event: &EventCaseInboxAssigneeChanged,
) -> Option<ThreadDelta> {
    if !event.in_thread(thread) {
        return None;
    }
    if thread.state == ThreadState::Closed {
        debug!(thread_id = %thread.id, "ignoring assignee change for closed thread");
        return None;
    }
    Some(
        ThreadDelta::new()
            .contact_id(Some(event.case_id.clone()))
            .position_in_queue(None)
            .state(ThreadState::Ready),
    )
}

/// The backend resent its view of the thread.
///
/// A closed thread still takes the recovered history but stays closed.
/// Contact fields are merged through `policy`; customer fields are not part
/// of the thread and are handled by the caller.
pub fn thread_recovered(
    thread: &ChatThread,
    event: &EventThreadRecovered,
    policy: &dyn FieldPolicy,
) -> Option<ThreadDelta> {
    if !event.in_thread(thread) {
        debug!(
            thread_id = %thread.id,
            recovered_id = %event.thread.id,
            "ignoring recovery for another thread"
        );
        return None;
    }

    let state = if thread.state == ThreadState::Closed {
        ThreadState::Closed
    } else if event.agent.is_some() {
        ThreadState::Ready
    } else {
        ThreadState::Loaded
    };
    let mut delta = ThreadDelta::new()
        .name(event.thread.name.clone())
        .messages(merge_messages(&thread.messages, &event.messages))
        .scroll_token(event.scroll_token.clone())
        .fields(merge_fields(&thread.fields, &event.thread.fields, policy))
        .state(state);
    if let Some(agent) = &event.agent {
        delta = delta.agent(Some(agent.clone()));
    }
    if let Some(contact_id) = &event.thread.contact_id {
        delta = delta.contact_id(Some(contact_id.clone()));
    }
    Some(delta)
}

/// A native update from the origin thread view.
///
/// Messages are merged, the scroll token is taken as-is and contact fields
/// go through `policy`. Lifecycle state, queue data and the agent belong to
/// the case events and are left alone.
pub fn origin_updated(
    thread: &ChatThread,
    updated: &ChatThread,
    policy: &dyn FieldPolicy,
) -> Option<ThreadDelta> {
    if updated.id != thread.id {
        debug!(thread_id = %thread.id, updated_id = %updated.id, "ignoring update for another thread");
        return None;
    }
    let mut delta = ThreadDelta::new()
        .messages(merge_messages(&thread.messages, &updated.messages))
        .scroll_token(updated.scroll_token.clone())
        .fields(merge_fields(&thread.fields, updated.fields.values(), policy));
    if updated.name.is_some() {
        delta = delta.name(updated.name.clone());
    }
    Some(delta)
}

/// The case was closed: the thread stops accepting messages.
pub fn case_status_changed(
    thread: &ChatThread,
    event: &EventCaseStatusChanged,
) -> Option<ThreadDelta> {
    if !event.is_closed() || !event.in_thread(thread) {
        return None;
    }
    Some(
        ThreadDelta::new()
            .state(ThreadState::Closed)
            .can_accept_more_messages(false),
    )
}
