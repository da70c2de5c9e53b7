// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live-chat thread synchronization.
//!
//! Keeps one conversation's client-side state consistent with the case and
//! queue events the backend pushes, while the customer keeps sending
//! messages through the same thread.
//!
//! - [`aggregate`]: the atomic-replace cell holding the thread
//! - [`reconciler`]: message merging and presentation filtering
//! - [`handlers`]: per-event deltas
//! - [`token_guard`]: refresh-before-send outbound decorator
//! - [`synchronizer`]: the orchestrating thread view

pub mod aggregate;
pub mod context;
pub mod handlers;
pub mod outbound;
pub mod reconciler;
pub mod synchronizer;
pub mod token_guard;

pub use aggregate::{ThreadCell, ThreadDelta};
pub use context::ChatContext;
pub use outbound::QueuedSender;
pub use reconciler::ThreadSnapshot;
pub use synchronizer::{SnapshotListener, ThreadSynchronizer};
pub use token_guard::TokenGuard;
