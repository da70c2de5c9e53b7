// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock outbound transport and token store.
//!
//! `MockTransport` implements `EventSender` by capturing every triggered
//! event, with scripted one-shot failures. `MockTokenStore` reports a fixed
//! or absent token expiry.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use livechat_core::{EventSender, LiveChatError, OutboundEvent, TokenStore};

type FailureMatcher = Box<dyn Fn(&OutboundEvent) -> bool + Send>;

/// Captures outbound events for assertions.
///
/// Failed triggers are not recorded.
pub struct MockTransport {
    sent: Mutex<Vec<OutboundEvent>>,
    failures: Mutex<Vec<FailureMatcher>>,
}

impl MockTransport {
    /// Create a transport that accepts everything.
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Fail the next trigger whose event matches `matcher`.
    pub fn fail_next<F>(&self, matcher: F)
    where
        F: Fn(&OutboundEvent) -> bool + Send + 'static,
    {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(matcher));
    }

    /// All events accepted so far, in trigger order.
    pub fn sent(&self) -> Vec<OutboundEvent> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn clear_sent(&self) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSender for MockTransport {
    fn trigger(&self, event: OutboundEvent) -> Result<(), LiveChatError> {
        {
            let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(index) = failures.iter().position(|matches| matches(&event)) {
                failures.remove(index);
                return Err(LiveChatError::transport(format!(
                    "scripted failure for {}",
                    event.name()
                )));
            }
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
        Ok(())
    }
}

/// Token store with a settable expiry.
pub struct MockTokenStore {
    expires_at: Mutex<Option<DateTime<Utc>>>,
}

impl MockTokenStore {
    /// A token whose expiry is not known.
    pub fn unknown() -> Self {
        Self {
            expires_at: Mutex::new(None),
        }
    }

    /// A token expiring at a fixed instant.
    pub fn expiring_at(at: DateTime<Utc>) -> Self {
        Self {
            expires_at: Mutex::new(Some(at)),
        }
    }

    /// A token expiring `in_` from now. Negative durations are already expired.
    pub fn expiring_in(in_: Duration) -> Self {
        Self::expiring_at(Utc::now() + in_)
    }

    pub fn set_expires_at(&self, at: Option<DateTime<Utc>>) {
        *self.expires_at.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl TokenStore for MockTokenStore {
    fn auth_token_expires_at(&self) -> Option<DateTime<Utc>> {
        *self.expires_at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_failure_is_one_shot() {
        let transport = MockTransport::new();
        transport.fail_next(|e| matches!(e, OutboundEvent::RefreshToken));

        assert!(transport.trigger(OutboundEvent::RefreshToken).is_err());
        assert!(transport.trigger(OutboundEvent::RefreshToken).is_ok());
        assert_eq!(transport.sent_count(), 1);
    }

    #[test]
    fn token_store_reports_settable_expiry() {
        let store = MockTokenStore::unknown();
        assert!(store.auth_token_expires_at().is_none());
        let at = Utc::now();
        store.set_expires_at(Some(at));
        assert_eq!(store.auth_token_expires_at(), Some(at));
    }
}
