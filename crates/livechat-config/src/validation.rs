// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::LiveChatConfig;

/// Accepted values for `logging.log_level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound for `auth.refresh_lookahead_secs`; tokens are short-lived.
const MAX_REFRESH_LOOKAHEAD_SECS: u64 = 3600;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LiveChatConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let lookahead = config.auth.refresh_lookahead_secs;
    if lookahead == 0 || lookahead > MAX_REFRESH_LOOKAHEAD_SECS {
        errors.push(ConfigError::Validation {
            message: format!(
                "auth.refresh_lookahead_secs must be between 1 and {MAX_REFRESH_LOOKAHEAD_SECS}, got {lookahead}"
            ),
        });
    }

    let level = config.logging.log_level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.log_level `{}` is not one of {}",
                config.logging.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let sections = [
        (
            "channel.contact_custom_fields",
            &config.channel.contact_custom_fields,
        ),
        (
            "channel.customer_custom_fields",
            &config.channel.customer_custom_fields,
        ),
    ];

    for (section, fields) in sections {
        let mut seen = HashSet::new();
        for (i, field) in fields.iter().enumerate() {
            if field.id.trim().is_empty() {
                errors.push(ConfigError::Validation {
                    message: format!("{section}[{i}].id must not be empty"),
                });
            } else if !seen.insert(field.id.as_str()) {
                errors.push(ConfigError::Validation {
                    message: format!("duplicate field id `{}` in {section}", field.id),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDefinition;

    fn field(id: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: String::new(),
        }
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&LiveChatConfig::default()).is_ok());
    }

    #[test]
    fn zero_lookahead_fails_validation() {
        let mut config = LiveChatConfig::default();
        config.auth.refresh_lookahead_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("refresh_lookahead_secs"))
        ));
    }

    #[test]
    fn unknown_log_level_fails_validation() {
        let mut config = LiveChatConfig::default();
        config.logging.log_level = "verbose".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = LiveChatConfig::default();
        config.logging.log_level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn duplicate_and_empty_field_ids_are_all_reported() {
        let mut config = LiveChatConfig::default();
        config.channel.contact_custom_fields = vec![field("order"), field("order"), field(" ")];
        config.channel.customer_custom_fields = vec![field("order")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2, "got {errors:?}");
    }
}
