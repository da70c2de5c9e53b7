// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow interfaces to the collaborators the engine consumes.
//!
//! The transport, token storage, channel configuration and the generic
//! thread view all live outside this workspace's core; the engine only sees
//! them through these traits.

pub mod auth;
pub mod cancellable;
pub mod policy;
pub mod thread;
pub mod transport;

pub use auth::TokenStore;
pub use cancellable::Cancellable;
pub use policy::FieldPolicy;
pub use thread::{ThreadHandler, ThreadListener};
pub use transport::EventSender;
