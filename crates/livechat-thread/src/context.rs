// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-level chat context shared by every thread view.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use livechat_bus::EventRegistry;
use livechat_config::{LiveChatConfig, SharedConfig};
use livechat_core::{CustomField, EventSender, FieldMap, FieldPolicy, TokenStore};

use crate::handlers::merge_fields;
use crate::token_guard::TokenGuard;

/// The collaborators a thread view needs: the inbound registry, the guarded
/// outbound path, the live configuration and the customer-field cache.
pub struct ChatContext {
    registry: EventRegistry,
    events: Arc<dyn EventSender>,
    config: Arc<SharedConfig>,
    customer_fields: Mutex<FieldMap>,
}

impl ChatContext {
    /// Builds a context whose outbound path is wrapped in a [`TokenGuard`]
    /// using the configured refresh lookahead.
    pub fn new(
        registry: EventRegistry,
        transport: Arc<dyn EventSender>,
        tokens: Arc<dyn TokenStore>,
        config: Arc<SharedConfig>,
    ) -> Self {
        let lookahead = config.current().auth.refresh_lookahead();
        let guard = TokenGuard::with_lookahead(transport, tokens, lookahead);
        Self {
            registry,
            events: Arc::new(guard),
            config,
            customer_fields: Mutex::new(FieldMap::new()),
        }
    }

    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// The guarded outbound sender.
    pub fn events(&self) -> &Arc<dyn EventSender> {
        &self.events
    }

    pub fn config(&self) -> Arc<LiveChatConfig> {
        self.config.current()
    }

    pub fn shared_config(&self) -> &Arc<SharedConfig> {
        &self.config
    }

    /// The allow-list backed by the live configuration.
    pub fn field_policy(&self) -> Arc<dyn FieldPolicy> {
        self.config.clone()
    }

    /// Merges customer fields into the cache, dropping ids the current
    /// configuration does not define.
    pub fn merge_customer_fields(&self, incoming: &[CustomField]) {
        let mut fields = self
            .customer_fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let merged = merge_fields(&fields, incoming, &*self.config);
        debug!(
            received = incoming.len(),
            cached = merged.len(),
            "customer fields merged"
        );
        *fields = merged;
    }

    /// Cached customer fields allowed by the current configuration.
    pub fn customer_fields(&self) -> FieldMap {
        let fields = self
            .customer_fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        fields
            .iter()
            .filter(|(id, _)| self.config.allows_field_id(id))
            .map(|(id, field)| (id.clone(), field.clone()))
            .collect()
    }
}

impl std::fmt::Debug for ChatContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatContext")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use livechat_config::model::FieldDefinition;
    use livechat_test_utils::{MockTokenStore, MockTransport};

    use super::*;

    fn config_with(customer: &[&str]) -> LiveChatConfig {
        let mut config = LiveChatConfig::default();
        config.channel.customer_custom_fields = customer
            .iter()
            .map(|id| FieldDefinition {
                id: id.to_string(),
                label: String::new(),
            })
            .collect();
        config
    }

    fn context(config: LiveChatConfig) -> ChatContext {
        ChatContext::new(
            EventRegistry::new(),
            Arc::new(MockTransport::new()),
            Arc::new(MockTokenStore::unknown()),
            Arc::new(SharedConfig::new(config)),
        )
    }

    #[test]
    fn customer_cache_merges_through_allow_list() {
        let ctx = context(config_with(&["email"]));
        ctx.merge_customer_fields(&[
            CustomField::new("email", "a@example.com"),
            CustomField::new("ssn", "nope"),
        ]);
        ctx.merge_customer_fields(&[CustomField::new("email", "b@example.com")]);

        let fields = ctx.customer_fields();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["email"].value, "b@example.com");
    }

    #[test]
    fn customer_cache_honors_config_change_on_read() {
        let ctx = context(config_with(&["email", "phone"]));
        ctx.merge_customer_fields(&[
            CustomField::new("email", "a@example.com"),
            CustomField::new("phone", "555"),
        ]);

        ctx.shared_config()
            .replace(config_with(&["phone"]))
            .expect("valid config");
        assert_eq!(ctx.customer_fields().keys().collect::<Vec<_>>(), vec!["phone"]);
    }
}
