// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end thread synchronization tests.
//!
//! `TestHarness` wires a [`ThreadSynchronizer`] to a mock transport, a mock
//! token store, a mock origin view and a fresh event registry, opens the
//! view, and records every snapshot the listener receives.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use livechat_bus::{CompositeCancellable, EventRegistry};
use livechat_config::{LiveChatConfig, SharedConfig};
use livechat_core::{ChatThread, InboundEvent, ThreadId};
use livechat_thread::{ChatContext, ThreadSnapshot, ThreadSynchronizer};

use crate::mock_thread::MockThreadHandler;
use crate::mock_transport::{MockTokenStore, MockTransport};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    thread: ChatThread,
    is_created: bool,
    config: LiveChatConfig,
    token_expires_at: Option<DateTime<Utc>>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            thread: ChatThread::resumed(ThreadId::from("thread-1"), Vec::new(), ""),
            is_created: false,
            config: LiveChatConfig::default(),
            token_expires_at: None,
        }
    }

    /// Start from `thread` instead of an empty loaded thread.
    pub fn with_thread(mut self, thread: ChatThread) -> Self {
        self.thread = thread;
        self
    }

    /// Start from a freshly created pending thread.
    pub fn created(mut self) -> Self {
        self.thread = ChatThread::new(self.thread.id.clone());
        self.is_created = true;
        self
    }

    pub fn with_config(mut self, config: LiveChatConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_token_expiry(mut self, at: DateTime<Utc>) -> Self {
        self.token_expires_at = Some(at);
        self
    }

    /// Build the harness and open the thread view.
    ///
    /// Must run inside a tokio runtime when the thread is `created`.
    pub fn build(self) -> TestHarness {
        let config = Arc::new(SharedConfig::new(self.config));
        let transport = Arc::new(MockTransport::new());
        let tokens = Arc::new(match self.token_expires_at {
            Some(at) => MockTokenStore::expiring_at(at),
            None => MockTokenStore::unknown(),
        });
        let registry = EventRegistry::new();
        let context = Arc::new(ChatContext::new(
            registry.clone(),
            transport.clone(),
            tokens.clone(),
            Arc::clone(&config),
        ));
        let origin = Arc::new(MockThreadHandler::new(self.thread.id.clone()));
        let synchronizer =
            ThreadSynchronizer::new(origin.clone(), Arc::clone(&context), self.thread, self.is_created);

        let snapshots = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&snapshots);
        let handle = synchronizer.open(move |snapshot| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(snapshot);
        });

        TestHarness {
            transport,
            tokens,
            origin,
            registry,
            config,
            context,
            synchronizer,
            snapshots,
            handle,
        }
    }
}

/// A fully wired thread view over mocks.
pub struct TestHarness {
    pub transport: Arc<MockTransport>,
    pub tokens: Arc<MockTokenStore>,
    pub origin: Arc<MockThreadHandler>,
    pub registry: EventRegistry,
    pub config: Arc<SharedConfig>,
    pub context: Arc<ChatContext>,
    pub synchronizer: ThreadSynchronizer,
    pub handle: CompositeCancellable,
    snapshots: Arc<Mutex<Vec<ThreadSnapshot>>>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn thread_id(&self) -> ThreadId {
        self.synchronizer.thread_id()
    }

    /// Deliver `event` through the registry; returns the handler count.
    pub fn dispatch(&self, event: InboundEvent) -> usize {
        self.registry.dispatch(&event)
    }

    /// Every snapshot delivered to the listener so far.
    pub fn snapshots(&self) -> Vec<ThreadSnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_snapshot(&self) -> Option<ThreadSnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    pub fn notification_count(&self) -> usize {
        self.snapshots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
