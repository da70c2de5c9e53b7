// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound decorator that refreshes the access token before it lapses.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use livechat_core::{EventSender, LiveChatError, OutboundEvent, TokenStore};

/// Default window before expiry in which a refresh is requested.
pub const DEFAULT_REFRESH_LOOKAHEAD: Duration = Duration::from_secs(10);

/// Wraps an [`EventSender`] so that every trigger first asks for a token
/// refresh when the current token is about to expire.
///
/// The refresh goes out on the same sender ahead of the original event. A
/// failed refresh is logged and never stops the original event.
pub struct TokenGuard {
    origin: Arc<dyn EventSender>,
    tokens: Arc<dyn TokenStore>,
    lookahead: Duration,
}

impl TokenGuard {
    pub fn new(origin: Arc<dyn EventSender>, tokens: Arc<dyn TokenStore>) -> Self {
        Self::with_lookahead(origin, tokens, DEFAULT_REFRESH_LOOKAHEAD)
    }

    pub fn with_lookahead(
        origin: Arc<dyn EventSender>,
        tokens: Arc<dyn TokenStore>,
        lookahead: Duration,
    ) -> Self {
        Self {
            origin,
            tokens,
            lookahead,
        }
    }

    /// Whether the stored token expires within the lookahead window.
    /// An unknown expiry never counts as expiring.
    pub fn is_expiring(&self) -> bool {
        let Some(expires_at) = self.tokens.auth_token_expires_at() else {
            return false;
        };
        let lookahead = chrono::Duration::from_std(self.lookahead)
            .unwrap_or(chrono::Duration::MAX);
        match Utc::now().checked_add_signed(lookahead) {
            Some(deadline) => expires_at < deadline,
            None => true,
        }
    }
}

impl EventSender for TokenGuard {
    fn trigger(&self, event: OutboundEvent) -> Result<(), LiveChatError> {
        if !matches!(event, OutboundEvent::RefreshToken) && self.is_expiring() {
            debug!(event = event.name(), "token expiring, requesting refresh");
            if let Err(e) = self.origin.trigger(OutboundEvent::RefreshToken) {
                warn!(error = %e, "token refresh failed to enqueue");
            }
        }
        self.origin.trigger(event)
    }
}

impl std::fmt::Debug for TokenGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGuard")
            .field("lookahead", &self.lookahead)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use livechat_core::ThreadId;
    use livechat_test_utils::{MockTokenStore, MockTransport};

    use super::*;

    fn recover() -> OutboundEvent {
        OutboundEvent::RecoverLivechatThread {
            thread_id: ThreadId::from("t"),
        }
    }

    fn guard(transport: &Arc<MockTransport>, tokens: MockTokenStore) -> TokenGuard {
        TokenGuard::new(transport.clone(), Arc::new(tokens))
    }

    #[test]
    fn expiring_in_five_seconds_refreshes_once_before_event() {
        let transport = Arc::new(MockTransport::new());
        let guard = guard(&transport, MockTokenStore::expiring_in(ChronoDuration::seconds(5)));

        guard.trigger(recover()).unwrap();

        assert_eq!(transport.sent(), vec![OutboundEvent::RefreshToken, recover()]);
    }

    #[test]
    fn expiring_in_twenty_seconds_does_not_refresh() {
        let transport = Arc::new(MockTransport::new());
        let guard = guard(&transport, MockTokenStore::expiring_in(ChronoDuration::seconds(20)));

        guard.trigger(recover()).unwrap();

        assert_eq!(transport.sent(), vec![recover()]);
    }

    #[test]
    fn unknown_expiry_does_not_refresh() {
        let transport = Arc::new(MockTransport::new());
        let guard = guard(&transport, MockTokenStore::unknown());

        guard.trigger(recover()).unwrap();

        assert_eq!(transport.sent(), vec![recover()]);
    }

    #[test]
    fn already_expired_refreshes() {
        let transport = Arc::new(MockTransport::new());
        let guard = guard(&transport, MockTokenStore::expiring_in(ChronoDuration::seconds(-30)));
        assert!(guard.is_expiring());
    }

    #[test]
    fn custom_lookahead_widens_window() {
        let transport = Arc::new(MockTransport::new());
        let guard = TokenGuard::with_lookahead(
            transport.clone(),
            Arc::new(MockTokenStore::expiring_in(ChronoDuration::seconds(20))),
            Duration::from_secs(60),
        );
        guard.trigger(recover()).unwrap();
        assert_eq!(transport.sent().len(), 2);
    }

    #[test]
    fn explicit_refresh_is_not_doubled() {
        let transport = Arc::new(MockTransport::new());
        let guard = guard(&transport, MockTokenStore::expiring_in(ChronoDuration::seconds(1)));
        guard.trigger(OutboundEvent::RefreshToken).unwrap();
        assert_eq!(transport.sent(), vec![OutboundEvent::RefreshToken]);
    }

    #[test]
    #[tracing_test::traced_test]
    fn refresh_failure_is_logged_and_event_still_sent() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_next(|e| matches!(e, OutboundEvent::RefreshToken));
        let guard = guard(&transport, MockTokenStore::expiring_in(ChronoDuration::seconds(5)));

        guard.trigger(recover()).unwrap();

        assert_eq!(transport.sent(), vec![recover()]);
        assert!(logs_contain("token refresh failed to enqueue"));
    }

    #[test]
    fn original_failure_is_returned() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_next(|e| matches!(e, OutboundEvent::RecoverLivechatThread { .. }));
        let guard = guard(&transport, MockTokenStore::unknown());
        assert!(matches!(
            guard.trigger(recover()),
            Err(LiveChatError::Transport { .. })
        ));
    }
}
