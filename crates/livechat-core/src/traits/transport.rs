// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound event channel.

use std::sync::Arc;

use crate::error::LiveChatError;
use crate::events::OutboundEvent;

/// Sends events to the backend.
///
/// `trigger` hands the event to the transport and returns without waiting
/// for delivery. It must never block the caller, since it is invoked from
/// the inbound dispatch context.
pub trait EventSender: Send + Sync {
    fn trigger(&self, event: OutboundEvent) -> Result<(), LiveChatError>;
}

impl<T: EventSender + ?Sized> EventSender for Arc<T> {
    fn trigger(&self, event: OutboundEvent) -> Result<(), LiveChatError> {
        (**self).trigger(event)
    }
}
