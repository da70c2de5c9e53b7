// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomically swappable configuration handle.
//!
//! The backend may republish the channel configuration mid-session. Readers
//! always see one complete configuration; a replacement applies to the next
//! read, so allow-list changes take effect on the next thread update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::info;

use livechat_core::FieldPolicy;

use crate::diagnostic::ConfigError;
use crate::model::LiveChatConfig;
use crate::validation::validate_config;

/// Shared, hot-replaceable configuration.
#[derive(Debug)]
pub struct SharedConfig {
    config: ArcSwap<LiveChatConfig>,
}

impl SharedConfig {
    pub fn new(config: LiveChatConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Current configuration.
    pub fn current(&self) -> Arc<LiveChatConfig> {
        self.config.load_full()
    }

    /// Validates and installs a new configuration.
    ///
    /// On validation failure the current configuration stays in place.
    pub fn replace(&self, config: LiveChatConfig) -> Result<(), Vec<ConfigError>> {
        validate_config(&config)?;
        info!(
            contact_fields = config.channel.contact_custom_fields.len(),
            customer_fields = config.channel.customer_custom_fields.len(),
            "configuration replaced"
        );
        self.config.store(Arc::new(config));
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self::new(LiveChatConfig::default())
    }
}

impl FieldPolicy for SharedConfig {
    fn allows_field_id(&self, id: &str) -> bool {
        self.config.load().channel.allows_field_id(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDefinition;

    fn with_fields(ids: &[&str]) -> LiveChatConfig {
        let mut config = LiveChatConfig::default();
        config.channel.contact_custom_fields = ids
            .iter()
            .map(|id| FieldDefinition {
                id: id.to_string(),
                label: String::new(),
            })
            .collect();
        config
    }

    #[test]
    fn replacement_changes_allow_list() {
        let shared = SharedConfig::new(with_fields(&["a", "b"]));
        assert!(shared.allows_field_id("b"));

        shared.replace(with_fields(&["a"])).expect("valid config");
        assert!(shared.allows_field_id("a"));
        assert!(!shared.allows_field_id("b"));
    }

    #[test]
    fn invalid_replacement_keeps_current() {
        let shared = SharedConfig::new(with_fields(&["a"]));
        let mut bad = with_fields(&["z"]);
        bad.auth.refresh_lookahead_secs = 0;

        assert!(shared.replace(bad).is_err());
        assert!(shared.allows_field_id("a"));
        assert!(!shared.allows_field_id("z"));
    }
}
