// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock origin thread view and cancellation handle.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use livechat_bus::OnCancel;
use livechat_core::{
    Cancellable, ChatThread, LiveChatError, MessageId, ThreadHandler, ThreadId, ThreadListener,
};

type Listeners = Arc<Mutex<Vec<(u64, ThreadListener)>>>;

/// Origin thread view whose native updates are pushed by the test.
///
/// Sent message texts are recorded; sends can be made to fail.
pub struct MockThreadHandler {
    id: ThreadId,
    listeners: Listeners,
    next_listener: AtomicU64,
    sent: Mutex<Vec<String>>,
    sent_notify: Notify,
    fail_sends: AtomicBool,
}

impl MockThreadHandler {
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
            sent_notify: Notify::new(),
            fail_sends: AtomicBool::new(false),
        }
    }

    /// Deliver `thread` to every subscribed listener, synchronously.
    pub fn push_update(&self, thread: ChatThread) {
        let listeners: Vec<ThreadListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(thread.clone());
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Texts passed to `send_message`, in call order.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Wait until at least `count` messages were sent, or `timeout` passes.
    /// Returns whether the count was reached.
    pub async fn wait_for_sent(&self, count: usize, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.sent_notify.notified();
                if self.sent_messages().len() >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }
}

#[async_trait]
impl ThreadHandler for MockThreadHandler {
    fn thread_id(&self) -> &ThreadId {
        &self.id
    }

    fn subscribe(&self, listener: ThreadListener) -> Box<dyn Cancellable> {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        let listeners = Arc::clone(&self.listeners);
        Box::new(OnCancel::new(move || {
            listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|(lid, _)| *lid != id);
            Ok(())
        }))
    }

    async fn send_message(&self, text: &str) -> Result<MessageId, LiveChatError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(LiveChatError::HandlerUnavailable("mock send failure".into()));
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        self.sent_notify.notify_waiters();
        Ok(MessageId::random())
    }
}

/// Cancellation handle that counts calls and can be told to fail.
pub struct CountingCancellable {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingCancellable {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Shared counter, readable after the handle was boxed away.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CountingCancellable {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellable for CountingCancellable {
    fn cancel(&self) -> Result<(), LiveChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(LiveChatError::Internal("cancellation refused".into()))
        } else {
            Ok(())
        }
    }
}
