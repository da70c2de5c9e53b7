// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The thread aggregate cell.
//!
//! A [`ThreadCell`] holds the one authoritative [`ChatThread`] for a
//! conversation. Every change is a whole-value replacement: the current value
//! is copied, the fields present in a [`ThreadDelta`] are overridden, the
//! result is normalized, and the new value is published atomically. Readers
//! never take a lock and never see a half-applied delta.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use tracing::debug;

use livechat_core::{
    Agent, ChatThread, ContactId, FieldMap, FieldPolicy, Message, ThreadState,
};

use crate::reconciler::{self, ThreadSnapshot};

/// A partial update of a [`ChatThread`].
///
/// `None` leaves a field as it is. For optional fields the inner `Option`
/// is the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadDelta {
    pub name: Option<Option<String>>,
    pub state: Option<ThreadState>,
    pub messages: Option<Vec<Message>>,
    pub scroll_token: Option<String>,
    pub contact_id: Option<Option<ContactId>>,
    pub position_in_queue: Option<Option<u32>>,
    pub has_online_agent: Option<bool>,
    pub agent: Option<Option<Agent>>,
    pub fields: Option<FieldMap>,
    pub can_accept_more_messages: Option<bool>,
}

impl ThreadDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn name(mut self, name: Option<String>) -> Self {
        self.name = Some(name);
        self
    }

    pub fn state(mut self, state: ThreadState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    pub fn scroll_token(mut self, token: impl Into<String>) -> Self {
        self.scroll_token = Some(token.into());
        self
    }

    pub fn contact_id(mut self, contact_id: Option<ContactId>) -> Self {
        self.contact_id = Some(contact_id);
        self
    }

    pub fn position_in_queue(mut self, position: Option<u32>) -> Self {
        self.position_in_queue = Some(position);
        self
    }

    pub fn has_online_agent(mut self, online: bool) -> Self {
        self.has_online_agent = Some(online);
        self
    }

    pub fn agent(mut self, agent: Option<Agent>) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn fields(mut self, fields: FieldMap) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn can_accept_more_messages(mut self, accept: bool) -> Self {
        self.can_accept_more_messages = Some(accept);
        self
    }

    /// Copies `thread` and overrides every field present in this delta.
    pub fn apply_to(self, thread: &ChatThread) -> ChatThread {
        let mut next = thread.clone();
        if let Some(name) = self.name {
            next.name = name;
        }
        if let Some(state) = self.state {
            next.state = state;
        }
        if let Some(messages) = self.messages {
            next.messages = messages;
        }
        if let Some(token) = self.scroll_token {
            next.scroll_token = token;
        }
        if let Some(contact_id) = self.contact_id {
            next.contact_id = contact_id;
        }
        if let Some(position) = self.position_in_queue {
            next.position_in_queue = position;
        }
        if let Some(online) = self.has_online_agent {
            next.has_online_agent = online;
        }
        if let Some(agent) = self.agent {
            next.agent = agent;
        }
        if let Some(fields) = self.fields {
            next.fields = fields;
        }
        if let Some(accept) = self.can_accept_more_messages {
            next.can_accept_more_messages = accept;
        }
        next
    }
}

/// Enforces the aggregate invariants on a candidate value.
///
/// Drops field ids the policy does not allow, forbids new messages on a
/// closed thread and keeps messages ordered and unique by id.
pub fn normalize(mut thread: ChatThread, policy: &dyn FieldPolicy) -> ChatThread {
    let before = thread.fields.len();
    thread.fields.retain(|id, _| policy.allows_field_id(id));
    let dropped = before - thread.fields.len();
    if dropped > 0 {
        debug!(thread_id = %thread.id, dropped, "dropped fields outside the allow-list");
    }
    if thread.state == ThreadState::Closed {
        thread.can_accept_more_messages = false;
    }
    thread.messages = reconciler::merge_messages(&[], &thread.messages);
    thread
}

/// Atomic-replace cell holding one thread aggregate.
pub struct ThreadCell {
    current: ArcSwap<ChatThread>,
    // Serializes writers so a delta is always computed from the latest value.
    write: Mutex<()>,
    policy: Arc<dyn FieldPolicy>,
}

impl ThreadCell {
    pub fn new(thread: ChatThread, policy: Arc<dyn FieldPolicy>) -> Self {
        let thread = normalize(thread, policy.as_ref());
        Self {
            current: ArcSwap::from_pointee(thread),
            write: Mutex::new(()),
            policy,
        }
    }

    /// The current raw aggregate.
    pub fn load(&self) -> Arc<ChatThread> {
        self.current.load_full()
    }

    /// The current aggregate, filtered for presentation.
    pub fn snapshot(&self) -> ThreadSnapshot {
        reconciler::filtered(&self.current.load())
    }

    /// Applies `delta` to the current value and publishes the result.
    pub fn replace(&self, delta: ThreadDelta) -> Arc<ChatThread> {
        self.update(|_| delta)
    }

    /// Computes a delta from the current value and applies it, all inside
    /// the write section.
    pub fn update<F>(&self, f: F) -> Arc<ChatThread>
    where
        F: FnOnce(&ChatThread) -> ThreadDelta,
    {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load_full();
        self.publish(&current, f(&current))
    }

    /// Like [`update`](Self::update), but `f` may decline by returning
    /// `None`, in which case nothing is written.
    pub fn update_if<F>(&self, f: F) -> Option<Arc<ChatThread>>
    where
        F: FnOnce(&ChatThread) -> Option<ThreadDelta>,
    {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load_full();
        let delta = f(&current)?;
        Some(self.publish(&current, delta))
    }

    /// Like [`update_if`](Self::update_if), and hands the published value to
    /// `observe` before the write section is released. Observers therefore
    /// see values in publication order, and the last one observed is always
    /// the current aggregate.
    ///
    /// `observe` must not write to this cell.
    pub fn update_if_observed<F, O>(&self, f: F, observe: O) -> Option<Arc<ChatThread>>
    where
        F: FnOnce(&ChatThread) -> Option<ThreadDelta>,
        O: FnOnce(&ChatThread),
    {
        let _guard = self.write.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load_full();
        let delta = f(&current)?;
        let next = self.publish(&current, delta);
        observe(&next);
        Some(next)
    }

    fn publish(&self, current: &ChatThread, delta: ThreadDelta) -> Arc<ChatThread> {
        let next = Arc::new(normalize(delta.apply_to(current), self.policy.as_ref()));
        debug!(
            thread_id = %next.id,
            state = %next.state,
            messages = next.messages.len(),
            "thread aggregate replaced"
        );
        self.current.store(Arc::clone(&next));
        next
    }
}

impl std::fmt::Debug for ThreadCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadCell")
            .field("current", &self.current.load_full())
            .finish_non_exhaustive()
    }
}
