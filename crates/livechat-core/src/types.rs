// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by every crate in the workspace: threads, messages,
//! agents and custom fields.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Text of the synthetic first message that makes the backend open a case
/// before the customer has written anything.
pub const BEGIN_CONVERSATION_MESSAGE: &str = "__Begin Livechat Conversation__";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Stable identifier of a chat thread.
    ThreadId
);
string_id!(
    /// Identifier of a message, unique within a thread.
    MessageId
);
string_id!(
    /// Identifier of the backend case (contact) currently tied to a thread.
    ContactId
);

/// Lifecycle state of a thread.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ThreadState {
    /// Created locally, the backend has not opened a case yet.
    Pending,
    /// History is known but no agent is assigned.
    Loaded,
    /// An agent is assigned and the conversation is live.
    Ready,
    /// The case was closed; no further messages are accepted.
    Closed,
}

/// Message direction from the backend's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageDirection {
    /// Inbound to the backend, usually written by the customer.
    #[serde(rename = "inbound")]
    ToAgent,
    /// Outbound from the backend, written by an agent or a bot.
    #[serde(rename = "outbound")]
    ToClient,
}

/// Author of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl MessageAuthor {
    /// Nickname when present, otherwise "first last" trimmed.
    pub fn display_name(&self) -> String {
        match &self.nickname {
            Some(nick) if !nick.trim().is_empty() => nick.clone(),
            _ => format!("{} {}", self.first_name, self.last_name)
                .trim()
                .to_string(),
        }
    }
}

/// Content of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text.
    Text { text: String },
    /// Rich content (pickers, quick replies, attachments) that this engine
    /// carries through without interpreting.
    Structured {
        kind: String,
        payload: serde_json::Value,
    },
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub created_at: DateTime<Utc>,
    pub direction: MessageDirection,
    #[serde(default)]
    pub author: Option<MessageAuthor>,
    pub content: MessageContent,
}

impl Message {
    /// Creates a text message with a fresh id, stamped with the current time.
    pub fn text(thread_id: ThreadId, direction: MessageDirection, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::random(),
            thread_id,
            created_at: Utc::now(),
            direction,
            author: None,
            content: MessageContent::Text { text: text.into() },
        }
    }

    /// Returns the text body for text messages.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text { text } => Some(text),
            MessageContent::Structured { .. } => None,
        }
    }

    /// Whether this is the synthetic conversation-starter placeholder.
    pub fn is_conversation_starter(&self) -> bool {
        self.as_text() == Some(BEGIN_CONVERSATION_MESSAGE)
    }
}

/// The agent (or bot) assigned to a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_bot_user: bool,
    #[serde(default)]
    pub is_surveyed: bool,
}

impl Agent {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A custom field value attached to a thread's contact or to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

impl CustomField {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Custom fields keyed by field id.
pub type FieldMap = BTreeMap<String, CustomField>;

/// The in-memory state of one chat thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: ThreadId,
    #[serde(default)]
    pub name: Option<String>,
    pub state: ThreadState,
    /// Ordered by creation time, unique by message id.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Pagination cursor; empty means "from the start".
    #[serde(default)]
    pub scroll_token: String,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    #[serde(default)]
    pub position_in_queue: Option<u32>,
    #[serde(default)]
    pub has_online_agent: bool,
    #[serde(default)]
    pub agent: Option<Agent>,
    #[serde(default)]
    pub fields: FieldMap,
    pub can_accept_more_messages: bool,
}

impl ChatThread {
    /// A freshly created thread with no history.
    pub fn new(id: ThreadId) -> Self {
        Self {
            id,
            name: None,
            state: ThreadState::Pending,
            messages: Vec::new(),
            scroll_token: String::new(),
            contact_id: None,
            position_in_queue: None,
            has_online_agent: false,
            agent: None,
            fields: FieldMap::new(),
            can_accept_more_messages: true,
        }
    }

    /// A thread resumed with known history.
    pub fn resumed(id: ThreadId, messages: Vec<Message>, scroll_token: impl Into<String>) -> Self {
        Self {
            state: ThreadState::Loaded,
            messages,
            scroll_token: scroll_token.into(),
            ..Self::new(id)
        }
    }
}
