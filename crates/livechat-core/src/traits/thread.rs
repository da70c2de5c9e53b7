// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The generic thread view that the live-chat synchronizer decorates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::LiveChatError;
use crate::traits::cancellable::Cancellable;
use crate::types::{ChatThread, MessageId, ThreadId};

/// Callback receiving thread updates.
pub type ThreadListener = Arc<dyn Fn(ChatThread) + Send + Sync>;

/// Origin handler for one thread: message sending plus its own update
/// stream (message arrivals, read receipts and the like).
#[async_trait]
pub trait ThreadHandler: Send + Sync {
    fn thread_id(&self) -> &ThreadId;

    /// Registers `listener` for the handler's native thread updates.
    fn subscribe(&self, listener: ThreadListener) -> Box<dyn Cancellable>;

    /// Sends a text message on the thread.
    async fn send_message(&self, text: &str) -> Result<MessageId, LiveChatError>;
}
