// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the current authentication token's lifetime.

use chrono::{DateTime, Utc};

/// Reports when the current access token expires.
pub trait TokenStore: Send + Sync {
    /// `None` when no expiry is known; callers treat that as never expiring.
    fn auth_token_expires_at(&self) -> Option<DateTime<Utc>>;
}
