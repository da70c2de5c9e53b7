// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for live-chat integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic tests
//! without a backend connection.
//!
//! # Components
//!
//! - [`MockTransport`] - Outbound sender capturing events, with scripted failures
//! - [`MockTokenStore`] - Token store with a settable expiry
//! - [`MockThreadHandler`] - Origin thread view with pushable native updates
//! - [`CountingCancellable`] - Cancellation handle that counts calls
//! - [`TestHarness`] - A thread view wired over all of the above

pub mod harness;
pub mod mock_thread;
pub mod mock_transport;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_thread::{CountingCancellable, MockThreadHandler};
pub use mock_transport::{MockTokenStore, MockTransport};
