// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the configuration system.

use std::io::Write;

use livechat_config::diagnostic::{ConfigError, suggest_key};
use livechat_config::model::LiveChatConfig;
use livechat_config::{
    SharedConfig, load_and_validate_path, load_and_validate_str, load_config_from_str,
};
use livechat_core::FieldPolicy;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[channel]
contact_custom_fields = [
    { id = "order_number", label = "Order number" },
    { id = "priority" },
]
customer_custom_fields = [{ id = "email", label = "E-mail" }]

[auth]
refresh_lookahead_secs = 30

[thread]
send_conversation_starter = false

[logging]
log_level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.channel.contact_custom_fields.len(), 2);
    assert_eq!(config.channel.contact_custom_fields[0].label, "Order number");
    assert_eq!(config.channel.contact_custom_fields[1].label, "");
    assert!(config.channel.allows_field_id("email"));
    assert!(config.channel.allows_field_id("priority"));
    assert!(!config.channel.allows_field_id("age"));
    assert_eq!(config.auth.refresh_lookahead_secs, 30);
    assert!(!config.thread.send_conversation_starter);
    assert_eq!(config.logging.log_level, "debug");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config, LiveChatConfig::default());
    assert_eq!(config.auth.refresh_lookahead_secs, 10);
    assert!(config.thread.send_conversation_starter);
}

/// Unknown field in [auth] section is rejected.
#[test]
fn unknown_field_in_auth_produces_error() {
    let toml = r#"
[auth]
refresh_lookahed_secs = 5
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("refresh_lookahed_secs"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown top-level section is rejected.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[metrics]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Diagnostic carries the typo suggestion and the section's valid keys.
#[test]
fn diagnostic_error_includes_suggestion_and_valid_keys() {
    let toml = r#"
[logging]
log_levle = "debug"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "log_levle"
                && suggestion.as_deref() == Some("log_level")
                && valid_keys.contains("log_level")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error for 'log_levle', got: {errors:?}"
    );
}

/// A wrong value type becomes an InvalidType diagnostic.
#[test]
fn diagnostic_invalid_type() {
    let toml = r#"
[auth]
refresh_lookahead_secs = "soon"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("refresh_lookahead_secs"))),
        "got: {errors:?}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_errors_surface_from_load_and_validate() {
    let toml = r#"
[auth]
refresh_lookahead_secs = 0

[logging]
log_level = "loud"
"#;

    let errors = load_and_validate_str(toml).expect_err("invalid values should fail");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

/// Env-style dotted overrides merge over TOML.
#[test]
fn dotted_override_wins_over_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: LiveChatConfig = Figment::new()
        .merge(Serialized::defaults(LiveChatConfig::default()))
        .merge(Toml::string("[auth]\nrefresh_lookahead_secs = 30\n"))
        .merge(("auth.refresh_lookahead_secs", 45))
        .extract()
        .expect("should merge override");

    assert_eq!(config.auth.refresh_lookahead_secs, 45);
}

/// Loading from an explicit file path.
#[test]
#[serial_test::serial]
fn load_from_file_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "[channel]\ncustomer_custom_fields = [{{ id = \"email\" }}]\n"
    )
    .expect("write config");

    let config = load_and_validate_path(file.path()).expect("file config should validate");
    assert!(config.channel.allows_field_id("email"));
}

#[test]
fn suggest_key_no_match_for_noise() {
    assert!(suggest_key("qqqq", &["contact_custom_fields"]).is_none());
}

/// Diagnostics render through miette without panicking.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::Validation {
        message: "auth.refresh_lookahead_secs must be between 1 and 3600, got 0".to_string(),
    };
    let diagnostic: &dyn Diagnostic = &error;
    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, diagnostic)
        .expect("should render");
    assert!(buf.contains("refresh_lookahead_secs"));
}

/// Shared config exposes the allow-list and picks up replacements.
#[test]
fn shared_config_acts_as_field_policy() {
    let config = load_and_validate_str("[channel]\ncontact_custom_fields = [{ id = \"a\" }]\n")
        .expect("valid");
    let shared = SharedConfig::new(config);
    assert!(shared.allows_field_id("a"));

    let next = load_and_validate_str("[channel]\ncontact_custom_fields = [{ id = \"b\" }]\n")
        .expect("valid");
    shared.replace(next).expect("replacement should validate");
    assert!(!shared.allows_field_id("a"));
    assert!(shared.allows_field_id("b"));
}
