// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind subscription registry over a single inbound event source.
//!
//! Handlers register for one [`EventKind`] with a typed payload and never
//! see each other. Delivery happens on one dispatch context, either the task
//! started by [`EventRegistry::spawn_dispatcher`] or a caller invoking
//! [`EventRegistry::dispatch`] directly, so events of a kind reach each
//! handler in receive order and at most once.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};

use livechat_core::{Cancellable, EventKind, InboundEvent, LiveChatError, ReceivedEvent};

type Handler = Arc<dyn Fn(&InboundEvent) + Send + Sync>;

struct Subscriber {
    id: u64,
    active: Arc<AtomicBool>,
    handler: Handler,
}

#[derive(Default)]
struct RegistryInner {
    subscribers: DashMap<EventKind, Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl RegistryInner {
    fn remove(&self, kind: EventKind, id: u64) {
        if let Some(mut list) = self.subscribers.get_mut(&kind) {
            list.retain(|s| s.id != id);
        }
    }
}

/// Typed, named-channel subscriptions over one event source.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Arc<RegistryInner>,
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of payload type `E`.
    ///
    /// The returned handle removes the registration when cancelled; dropping
    /// it without cancelling leaves the handler registered.
    pub fn subscribe<E, F>(&self, handler: F) -> Subscription
    where
        E: ReceivedEvent,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let typed: Handler = Arc::new(move |event: &InboundEvent| {
            if let Some(payload) = E::from_inbound(event) {
                handler(payload);
            }
        });

        self.inner
            .subscribers
            .entry(E::KIND)
            .or_default()
            .push(Subscriber {
                id,
                active: Arc::clone(&active),
                handler: typed,
            });
        debug!(kind = %E::KIND, id, "subscribed");

        Subscription {
            id,
            kind: E::KIND,
            active,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every active handler of its kind.
    ///
    /// Returns the number of handlers invoked. The handler list is copied
    /// before invocation, so handlers may subscribe or cancel freely.
    pub fn dispatch(&self, event: &InboundEvent) -> usize {
        let kind = event.kind();
        let handlers: Vec<(Arc<AtomicBool>, Handler)> = self
            .inner
            .subscribers
            .get(&kind)
            .map(|list| {
                list.iter()
                    .map(|s| (Arc::clone(&s.active), Arc::clone(&s.handler)))
                    .collect()
            })
            .unwrap_or_default();

        let mut delivered = 0;
        for (active, handler) in handlers {
            // A handler cancelled by an earlier one in this round is skipped.
            if active.load(Ordering::Acquire) {
                handler(event);
                delivered += 1;
            }
        }

        if delivered == 0 {
            trace!(%kind, "no subscribers for inbound event");
        } else {
            trace!(%kind, delivered, "inbound event dispatched");
        }
        delivered
    }

    /// Spawns the dispatch task draining `events` until the sender side
    /// closes or `cancel` fires.
    pub fn spawn_dispatcher(
        &self,
        mut events: mpsc::Receiver<InboundEvent>,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            info!("event dispatcher running");
            loop {
                tokio::select! {
                    event = events.recv() => {
                        match event {
                            Some(event) => {
                                debug!(kind = %event.kind(), "inbound event");
                                registry.dispatch(&event);
                            }
                            None => {
                                info!("event source closed, dispatcher stopping");
                                break;
                            }
                        }
                    }
                    _ = cancel.cancelled() => {
                        info!("dispatcher cancelled");
                        break;
                    }
                }
            }
        })
    }

    /// Number of live registrations across all kinds.
    pub fn subscription_count(&self) -> usize {
        self.inner.subscribers.iter().map(|e| e.value().len()).sum()
    }

    /// Number of live registrations for `kind`.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner
            .subscribers
            .get(&kind)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

/// Handle for one registration in an [`EventRegistry`].
pub struct Subscription {
    id: u64,
    kind: EventKind,
    active: Arc<AtomicBool>,
    registry: Weak<RegistryInner>,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Cancellable for Subscription {
    fn cancel(&self) -> Result<(), LiveChatError> {
        if self.active.swap(false, Ordering::AcqRel) {
            // Registry already dropped means nothing is left to remove.
            if let Some(inner) = self.registry.upgrade() {
                inner.remove(self.kind, self.id);
            }
            debug!(kind = %self.kind, id = self.id, "unsubscribed");
        }
        Ok(())
    }
}
