// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the live-chat thread engine.
//!
//! This crate provides the domain types, the decoded event variants, the
//! error type and the collaborator traits used throughout the workspace.
//! Transports, token storage and configuration plug in by implementing the
//! traits defined here.

pub mod error;
pub mod events;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LiveChatError;
pub use events::{EventKind, InboundEvent, OutboundEvent, ReceivedEvent};
pub use types::{
    Agent, ChatThread, ContactId, CustomField, FieldMap, Message, MessageId, ThreadId, ThreadState,
    BEGIN_CONVERSATION_MESSAGE,
};

pub use traits::{Cancellable, EventSender, FieldPolicy, ThreadHandler, ThreadListener, TokenStore};
