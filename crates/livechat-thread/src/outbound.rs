// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound queue: the seam between the engine and a transport writer.
//!
//! [`QueuedSender::channel`] returns the sender half the engine triggers on
//! and the receiver half a transport task drains. Triggering never waits.

use tokio::sync::mpsc;
use tracing::trace;

use livechat_core::{EventSender, LiveChatError, OutboundEvent};

/// Non-blocking [`EventSender`] backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct QueuedSender {
    tx: mpsc::UnboundedSender<OutboundEvent>,
}

impl QueuedSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Whether the receiving transport has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl EventSender for QueuedSender {
    fn trigger(&self, event: OutboundEvent) -> Result<(), LiveChatError> {
        let name = event.name();
        self.tx
            .send(event)
            .map_err(|_| LiveChatError::transport(format!("outbound queue closed, dropped {name}")))?;
        trace!(event = name, "outbound event queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_events_arrive_in_order() {
        let (sender, mut rx) = QueuedSender::channel();
        sender.trigger(OutboundEvent::RefreshToken).unwrap();
        sender
            .trigger(OutboundEvent::EndContact {
                thread_id: "t".into(),
                contact_id: None,
            })
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), OutboundEvent::RefreshToken);
        assert_eq!(rx.try_recv().unwrap().name(), "end_contact");
    }

    #[test]
    fn closed_queue_is_a_transport_error() {
        let (sender, rx) = QueuedSender::channel();
        drop(rx);
        assert!(sender.is_closed());
        let err = sender.trigger(OutboundEvent::RefreshToken).unwrap_err();
        assert!(err.to_string().contains("refresh_token"), "got: {err}");
    }
}
