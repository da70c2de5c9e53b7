// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline replay of a recorded inbound event log against one thread view.
//!
//! The log is JSON lines, one decoded [`InboundEvent`] per line. Every
//! snapshot the view reports and every outbound event it triggers are
//! written to stdout as JSON lines.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use livechat_bus::{EventRegistry, OnCancel};
use livechat_config::{LiveChatConfig, SharedConfig};
use livechat_core::{
    Cancellable, ChatThread, EventSender, InboundEvent, LiveChatError, MessageId, OutboundEvent,
    ThreadHandler, ThreadId, ThreadListener, TokenStore,
};
use livechat_thread::{ChatContext, QueuedSender, ThreadSynchronizer};

/// Replay settings from the command line.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    pub thread_id: ThreadId,
    /// Treat the thread as freshly created (pending, no history).
    pub created: bool,
}

/// Parses a JSON-lines event log. Blank lines are skipped; malformed lines
/// are logged and skipped.
pub fn parse_events(content: &str) -> Vec<InboundEvent> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed event");
                None
            }
        })
        .collect()
}

/// Token store for replay: expiry is never known, so no refresh is issued.
struct NoExpiry;

impl TokenStore for NoExpiry {
    fn auth_token_expires_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Origin view for replay: sends become outbound `SendMessage` events and
/// there is no native update stream.
struct ReplayOrigin {
    id: ThreadId,
    events: Arc<dyn EventSender>,
}

#[async_trait]
impl ThreadHandler for ReplayOrigin {
    fn thread_id(&self) -> &ThreadId {
        &self.id
    }

    fn subscribe(&self, _listener: ThreadListener) -> Box<dyn Cancellable> {
        Box::new(OnCancel::new(|| Ok(())))
    }

    async fn send_message(&self, text: &str) -> Result<MessageId, LiveChatError> {
        let message_id = MessageId::random();
        self.events.trigger(OutboundEvent::SendMessage {
            thread_id: self.id.clone(),
            message_id: message_id.clone(),
            text: text.to_string(),
        })?;
        Ok(message_id)
    }
}

fn emit(line: serde_json::Value) {
    println!("{line}");
}

/// Replays the log at `path` and returns the number of events delivered.
pub async fn run(
    path: &Path,
    options: ReplayOptions,
    config: LiveChatConfig,
) -> Result<usize, LiveChatError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        LiveChatError::Internal(format!("cannot read {}: {e}", path.display()))
    })?;
    let events = parse_events(&content);
    info!(path = %path.display(), events = events.len(), "replaying event log");

    let (sender, mut outbound) = QueuedSender::channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            emit(json!({ "outbound": event }));
        }
    });

    let registry = EventRegistry::new();
    let context = Arc::new(ChatContext::new(
        registry.clone(),
        Arc::new(sender),
        Arc::new(NoExpiry),
        Arc::new(SharedConfig::new(config)),
    ));
    let origin = Arc::new(ReplayOrigin {
        id: options.thread_id.clone(),
        events: Arc::clone(context.events()),
    });
    let thread = if options.created {
        ChatThread::new(options.thread_id.clone())
    } else {
        ChatThread::resumed(options.thread_id.clone(), Vec::new(), "")
    };

    let synchronizer = ThreadSynchronizer::new(origin, Arc::clone(&context), thread, options.created);
    let view = synchronizer.open(|snapshot| {
        emit(json!({ "snapshot": &*snapshot }));
    });

    let (tx, rx) = mpsc::channel(64);
    let dispatcher = registry.spawn_dispatcher(rx, CancellationToken::new());
    let total = events.len();
    for event in events {
        tx.send(event)
            .await
            .map_err(|_| LiveChatError::Internal("dispatcher stopped early".into()))?;
    }
    drop(tx);
    dispatcher
        .await
        .map_err(|e| LiveChatError::Internal(format!("dispatcher task failed: {e}")))?;

    view.cancel()?;
    // The printer ends once every holder of the outbound sender is gone,
    // including a starter send still in flight.
    drop(synchronizer);
    drop(context);
    printer
        .await
        .map_err(|e| LiveChatError::Internal(format!("output task failed: {e}")))?;

    info!(events = total, "replay finished");
    Ok(total)
}
