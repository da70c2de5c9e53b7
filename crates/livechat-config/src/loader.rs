// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./livechat.toml` > `~/.config/livechat/livechat.toml` >
//! `/etc/livechat/livechat.toml` with environment variable overrides via `LIVECHAT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LiveChatConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/livechat/livechat.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "livechat.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/livechat/livechat.toml` (system-wide)
/// 3. `~/.config/livechat/livechat.toml` (user XDG config)
/// 4. `./livechat.toml` (local directory)
/// 5. `LIVECHAT_*` environment variables
pub fn load_config() -> Result<LiveChatConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LiveChatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LiveChatConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LiveChatConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LiveChatConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Path of the per-user configuration file, if a config dir is known.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("livechat/livechat.toml"))
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LiveChatConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LIVECHAT_AUTH_REFRESH_LOOKAHEAD_SECS` must map to
/// `auth.refresh_lookahead_secs`, not `auth.refresh.lookahead.secs`.
fn env_provider() -> Env {
    Env::prefixed("LIVECHAT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let mapped = key
            .as_str()
            .replacen("auth_", "auth.", 1)
            .replacen("thread_", "thread.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
