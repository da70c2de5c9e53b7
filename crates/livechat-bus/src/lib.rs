// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event subscription registry for the live-chat thread engine.
//!
//! One inbound event source fans out to typed per-kind handlers. Every
//! registration hands back a cancellable handle, and groups of handles can
//! be released together through [`CompositeCancellable`].

pub mod cancel;
pub mod registry;

pub use cancel::{CompositeCancellable, OnCancel};
pub use registry::{EventRegistry, Subscription};
