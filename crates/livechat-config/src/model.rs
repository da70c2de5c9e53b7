// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the live-chat thread engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

use livechat_core::FieldPolicy;

/// Top-level configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LiveChatConfig {
    /// Channel configuration published by the backend.
    #[serde(default)]
    pub channel: ChannelConfig,

    /// Access token handling.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Per-thread behavior.
    #[serde(default)]
    pub thread: ThreadConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// A custom field definition from the channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    /// Field id as used in thread and customer payloads.
    pub id: String,

    /// Human-readable label.
    #[serde(default)]
    pub label: String,
}

/// Channel configuration: which custom fields the channel defines.
///
/// The union of contact and customer field ids is the allow-list applied to
/// every field update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfig {
    /// Fields attached to the contact (case) of a thread.
    #[serde(default)]
    pub contact_custom_fields: Vec<FieldDefinition>,

    /// Fields attached to the customer across all threads.
    #[serde(default)]
    pub customer_custom_fields: Vec<FieldDefinition>,
}

impl ChannelConfig {
    /// Whether `id` is defined as a contact or customer field.
    pub fn allows_field_id(&self, id: &str) -> bool {
        self.contact_custom_fields
            .iter()
            .chain(self.customer_custom_fields.iter())
            .any(|field| field.id == id)
    }
}

impl FieldPolicy for ChannelConfig {
    fn allows_field_id(&self, id: &str) -> bool {
        ChannelConfig::allows_field_id(self, id)
    }
}

/// Access token handling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Refresh the token proactively when it expires within this many seconds.
    #[serde(default = "default_refresh_lookahead_secs")]
    pub refresh_lookahead_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_lookahead_secs: default_refresh_lookahead_secs(),
        }
    }
}

impl AuthConfig {
    pub fn refresh_lookahead(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_lookahead_secs)
    }
}

fn default_refresh_lookahead_secs() -> u64 {
    10
}

/// Per-thread behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ThreadConfig {
    /// Send the conversation-starter placeholder when a new thread is opened.
    #[serde(default = "default_true")]
    pub send_conversation_starter: bool,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            send_conversation_starter: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
