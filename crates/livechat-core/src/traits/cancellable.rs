// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cancellation handle returned by every subscription.

use crate::error::LiveChatError;

/// A handle that ends a registration when cancelled.
///
/// Implementations must be idempotent: cancelling an already-cancelled
/// handle succeeds and has no further effect.
pub trait Cancellable: Send + Sync {
    fn cancel(&self) -> Result<(), LiveChatError>;
}

impl<T: Cancellable + ?Sized> Cancellable for Box<T> {
    fn cancel(&self) -> Result<(), LiveChatError> {
        (**self).cancel()
    }
}
