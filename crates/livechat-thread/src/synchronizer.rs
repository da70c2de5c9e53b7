// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread synchronizer: binds one thread aggregate to the inbound event
//! stream and the guarded outbound path.
//!
//! The synchronizer wraps an origin [`ThreadHandler`] and adds the live-chat
//! behavior on top of it. Every change, from a case event or from the origin
//! view itself, goes through the [`ThreadCell`] and is reported to the
//! listener as a filtered [`ThreadSnapshot`].

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use livechat_bus::CompositeCancellable;
use livechat_core::events::{
    EventCaseInboxAssigneeChanged, EventCaseStatusChanged, EventSetPositionInQueue,
    EventThreadRecovered,
};
use livechat_core::{
    BEGIN_CONVERSATION_MESSAGE, Cancellable, ChatThread, LiveChatError, MessageId,
    OutboundEvent, ThreadHandler, ThreadId, ThreadListener, ThreadState,
};

use crate::aggregate::{ThreadCell, ThreadDelta};
use crate::context::ChatContext;
use crate::handlers;
use crate::reconciler::{self, ThreadSnapshot};

/// Receives every filtered snapshot after a change.
pub type SnapshotListener = Arc<dyn Fn(ThreadSnapshot) + Send + Sync>;

/// Live-chat view of one thread.
pub struct ThreadSynchronizer {
    origin: Arc<dyn ThreadHandler>,
    context: Arc<ChatContext>,
    cell: Arc<ThreadCell>,
}

impl ThreadSynchronizer {
    /// Creates the view for `thread`.
    ///
    /// When `is_created` is set and the thread is still pending with no
    /// messages, a conversation-starter message is sent through the origin
    /// handler on a background task.
    pub fn new(
        origin: Arc<dyn ThreadHandler>,
        context: Arc<ChatContext>,
        thread: ChatThread,
        is_created: bool,
    ) -> Self {
        let cell = Arc::new(ThreadCell::new(thread, context.field_policy()));
        let synchronizer = Self {
            origin,
            context,
            cell,
        };
        if is_created {
            synchronizer.start_conversation();
        }
        synchronizer
    }

    pub fn thread_id(&self) -> ThreadId {
        self.cell.load().id.clone()
    }

    /// Current filtered view of the thread.
    pub fn snapshot(&self) -> ThreadSnapshot {
        self.cell.snapshot()
    }

    /// Subscribes to the case and queue events and to the origin view's own
    /// updates. `listener` receives a snapshot after every applied change,
    /// in the order the changes were written. It runs while the thread is
    /// locked for writing and must not feed events back into this view
    /// synchronously.
    ///
    /// Cancelling the returned handle releases all five subscriptions.
    pub fn open<L>(&self, listener: L) -> CompositeCancellable
    where
        L: Fn(ThreadSnapshot) + Send + Sync + 'static,
    {
        let notify: SnapshotListener = Arc::new(listener);
        let registry = self.context.registry();

        let queue = {
            let cell = Arc::clone(&self.cell);
            let notify = Arc::clone(&notify);
            registry.subscribe(move |event: &EventSetPositionInQueue| {
                apply_and_notify(&cell, &notify, |t| handlers::queue_position(t, event));
            })
        };

        let assignee = {
            let cell = Arc::clone(&self.cell);
            let notify = Arc::clone(&notify);
            registry.subscribe(move |event: &EventCaseInboxAssigneeChanged| {
                apply_and_notify(&cell, &notify, |t| handlers::assignee_changed(t, event));
            })
        };

        let recovered = {
            let cell = Arc::clone(&self.cell);
            let notify = Arc::clone(&notify);
            let context = Arc::clone(&self.context);
            registry.subscribe(move |event: &EventThreadRecovered| {
                let policy = context.field_policy();
                let applied = apply_and_notify(&cell, &notify, |t| {
                    handlers::thread_recovered(t, event, policy.as_ref())
                });
                if applied {
                    context.merge_customer_fields(&event.customer_fields);
                }
            })
        };

        let status = {
            let cell = Arc::clone(&self.cell);
            let notify = Arc::clone(&notify);
            registry.subscribe(move |event: &EventCaseStatusChanged| {
                apply_and_notify(&cell, &notify, |t| handlers::case_status_changed(t, event));
            })
        };

        let native = {
            let cell = Arc::clone(&self.cell);
            let notify = Arc::clone(&notify);
            let context = Arc::clone(&self.context);
            let on_update: ThreadListener = Arc::new(move |updated: ChatThread| {
                let policy = context.field_policy();
                apply_and_notify(&cell, &notify, |t| {
                    handlers::origin_updated(t, &updated, policy.as_ref())
                });
            });
            self.origin.subscribe(on_update)
        };

        let handles: Vec<Box<dyn Cancellable>> = vec![
            Box::new(queue),
            Box::new(assignee),
            Box::new(recovered),
            Box::new(status),
            native,
        ];
        info!(thread_id = %self.thread_id(), subscriptions = handles.len(), "thread view opened");
        CompositeCancellable::new(handles)
    }

    /// Asks the backend to end the contact tied to this thread. The local
    /// state changes only when the resulting case event arrives.
    pub fn end_conversation(&self) -> Result<(), LiveChatError> {
        let thread = self.cell.load();
        info!(thread_id = %thread.id, "ending conversation");
        self.context.events().trigger(OutboundEvent::EndContact {
            thread_id: thread.id.clone(),
            contact_id: thread.contact_id.clone(),
        })
    }

    /// Asks the backend to resend the thread. Pending threads have nothing
    /// to recover yet and are skipped.
    pub fn refresh(&self) -> Result<(), LiveChatError> {
        let thread = self.cell.load();
        if thread.state == ThreadState::Pending {
            debug!(thread_id = %thread.id, "refresh skipped for pending thread");
            return Ok(());
        }
        self.context
            .events()
            .trigger(OutboundEvent::RecoverLivechatThread {
                thread_id: thread.id.clone(),
            })
    }

    /// Sends a text message through the origin handler.
    pub async fn send_message(&self, text: &str) -> Result<MessageId, LiveChatError> {
        self.origin.send_message(text).await
    }

    fn start_conversation(&self) {
        if !self.context.config().thread.send_conversation_starter {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no tokio runtime, conversation starter not sent");
            return;
        };

        let origin = Arc::clone(&self.origin);
        let cell = Arc::clone(&self.cell);
        runtime.spawn(async move {
            let thread = cell.load();
            let fresh = thread.state == ThreadState::Pending
                && thread.messages.is_empty()
                && thread.can_accept_more_messages;
            if !fresh {
                debug!(thread_id = %thread.id, state = %thread.state, "conversation starter not needed");
                return;
            }
            match origin.send_message(BEGIN_CONVERSATION_MESSAGE).await {
                Ok(id) => debug!(thread_id = %thread.id, message_id = %id, "conversation starter sent"),
                Err(e) => warn!(thread_id = %thread.id, error = %e, "conversation starter failed"),
            }
        });
    }
}

/// Runs `compute` inside the write section and, on success, notifies before
/// the section is released so snapshots reach the listener in write order.
/// Returns whether a delta was applied.
fn apply_and_notify<F>(cell: &ThreadCell, notify: &SnapshotListener, compute: F) -> bool
where
    F: FnOnce(&ChatThread) -> Option<ThreadDelta>,
{
    cell.update_if_observed(compute, |updated| notify(reconciler::filtered(updated)))
        .is_some()
}

impl std::fmt::Debug for ThreadSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadSynchronizer")
            .field("cell", &self.cell)
            .finish_non_exhaustive()
    }
}
