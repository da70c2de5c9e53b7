// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the live-chat thread engine.

use thiserror::Error;

/// The primary error type used across the collaborator traits and the engine.
#[derive(Debug, Error)]
pub enum LiveChatError {
    /// Configuration errors (invalid values, unknown keys, missing sections).
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport refused or failed to enqueue an outbound event.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One or more subscriptions in a composite handle failed to cancel.
    ///
    /// Every cancellation in the set was attempted before this was returned.
    #[error("failed to cancel {failed} of {total} subscriptions: {message}")]
    Cancellation {
        failed: usize,
        total: usize,
        message: String,
    },

    /// The origin thread handler is gone or cannot serve the request.
    #[error("thread handler unavailable: {0}")]
    HandlerUnavailable(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LiveChatError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        LiveChatError::Transport {
            message: message.into(),
            source: None,
        }
    }
}
