// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Every problem found while loading `livechat.toml` becomes a [`ConfigError`]
//! that miette can render. Misspelled keys get a "did you mean" hint from
//! Jaro-Winkler similarity, and each diagnostic names the layer (file or
//! environment variable) that produced the bad value.

use miette::Diagnostic;
use thiserror::Error;

/// Keys closer than this are offered as corrections.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(section))]
    #[diagnostic(
        code(livechat::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys, origin.as_deref()))
    )]
    UnknownKey {
        /// Dotted path of the enclosing section, empty at the top level.
        section: String,
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        /// File path or provider name the key came from.
        origin: Option<String>,
    },

    #[error("`{key}` has the wrong type: {detail}")]
    #[diagnostic(code(livechat::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(livechat::config::missing_key),
        help("add `{key} = <value>` to livechat.toml")
    )]
    MissingKey { key: String },

    /// Semantic check that failed after a successful parse.
    #[error("validation error: {message}")]
    #[diagnostic(code(livechat::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(livechat::config::other))]
    Other(String),
}

fn section_label(section: &str) -> String {
    if section.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{section}]")
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str, origin: Option<&str>) -> String {
    let mut help = match suggestion {
        Some(s) => format!("did you mean `{s}`? valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    };
    if let Some(origin) = origin {
        help.push_str(&format!(" (set in {origin})"));
    }
    help
}

/// Where a figment error came from: a file path, or the provider's name for
/// env vars and inline strings.
fn error_origin(error: &figment::Error) -> Option<String> {
    let metadata = error.metadata.as_ref()?;
    match &metadata.source {
        Some(figment::Source::File(path)) => Some(path.display().to_string()),
        _ => Some(metadata.name.to_string()),
    }
}

/// Splits a figment error into one diagnostic per underlying problem.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path = error.path.join(".");
            match &error.kind {
                Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    origin: error_origin(&error),
                    section: path,
                    key: field.clone(),
                },
                Kind::MissingField(field) => ConfigError::MissingKey {
                    key: if path.is_empty() {
                        field.to_string()
                    } else {
                        format!("{path}.{field}")
                    },
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: path,
                    detail: format!("found {actual}, expected {expected}"),
                    expected: expected.to_string(),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The valid key most similar to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each diagnostic to stderr through miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("livechat: {error}"),
        }
    }
}
