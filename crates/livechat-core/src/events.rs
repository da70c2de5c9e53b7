// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoded inbound and outbound events.
//!
//! Decoding from the wire happens in the transport; this module only defines
//! the tagged variants the engine consumes and produces. The `serde` derives
//! exist so recorded event logs can be replayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{Agent, ChatThread, ContactId, CustomField, Message, MessageId, ThreadId};

/// Kind of an inbound event, used as the subscription key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum EventKind {
    SetPositionInQueue,
    CaseInboxAssigneeChanged,
    LivechatRecovered,
    CaseStatusChanged,
    /// Anything the engine does not interpret.
    Other,
}

/// The customer's place in the wait line changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSetPositionInQueue {
    pub consumer_contact: ContactId,
    pub position_in_queue: u32,
    pub has_online_agent: bool,
}

/// The case was (re)assigned to an agent inbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCaseInboxAssigneeChanged {
    pub case_id: ContactId,
    pub thread_id: ThreadId,
    #[serde(default)]
    pub assignee: Option<Agent>,
}

impl EventCaseInboxAssigneeChanged {
    pub fn in_thread(&self, thread: &ChatThread) -> bool {
        self.thread_id == thread.id
    }
}

/// Thread data carried by a recovery response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveredThread {
    pub id: ThreadId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_id: Option<ContactId>,
    /// Contact custom fields, unfiltered.
    #[serde(default)]
    pub fields: Vec<CustomField>,
}

/// Response to a "recover thread" request: the server's view of the thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventThreadRecovered {
    pub thread: RecoveredThread,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub scroll_token: String,
    #[serde(default)]
    pub agent: Option<Agent>,
    /// Customer custom fields, unfiltered.
    #[serde(default)]
    pub customer_fields: Vec<CustomField>,
}

impl EventThreadRecovered {
    /// The payload describes `thread`. Message-level thread ids are not
    /// checked; the backend may label them differently.
    pub fn in_thread(&self, thread: &ChatThread) -> bool {
        self.thread.id == thread.id
    }
}

/// Status of a backend case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    New,
    Open,
    Pending,
    Escalated,
    Resolved,
    Closed,
    Trashed,
}

/// The status of the case tied to a thread changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCaseStatusChanged {
    pub case_id: ContactId,
    pub thread_id: ThreadId,
    pub status: CaseStatus,
    pub status_updated_at: DateTime<Utc>,
}

impl EventCaseStatusChanged {
    pub fn in_thread(&self, thread: &ChatThread) -> bool {
        self.thread_id == thread.id
    }

    pub fn is_closed(&self) -> bool {
        self.status == CaseStatus::Closed
    }
}

/// An event kind the engine carries but does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownEvent {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InboundEvent {
    SetPositionInQueue(EventSetPositionInQueue),
    CaseInboxAssigneeChanged(EventCaseInboxAssigneeChanged),
    LivechatRecovered(EventThreadRecovered),
    CaseStatusChanged(EventCaseStatusChanged),
    Other(UnknownEvent),
}

impl InboundEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InboundEvent::SetPositionInQueue(_) => EventKind::SetPositionInQueue,
            InboundEvent::CaseInboxAssigneeChanged(_) => EventKind::CaseInboxAssigneeChanged,
            InboundEvent::LivechatRecovered(_) => EventKind::LivechatRecovered,
            InboundEvent::CaseStatusChanged(_) => EventKind::CaseStatusChanged,
            InboundEvent::Other(_) => EventKind::Other,
        }
    }
}

/// A typed payload that can be subscribed to by kind.
///
/// `from_inbound` must return `Some` exactly when `event.kind() == KIND`.
pub trait ReceivedEvent: Send + Sync + 'static {
    const KIND: EventKind;

    fn from_inbound(event: &InboundEvent) -> Option<&Self>;
}

macro_rules! received_event {
    ($payload:ty, $variant:ident) => {
        impl ReceivedEvent for $payload {
            const KIND: EventKind = EventKind::$variant;

            fn from_inbound(event: &InboundEvent) -> Option<&Self> {
                match event {
                    InboundEvent::$variant(payload) => Some(payload),
                    _ => None,
                }
            }
        }
    };
}

received_event!(EventSetPositionInQueue, SetPositionInQueue);
received_event!(EventCaseInboxAssigneeChanged, CaseInboxAssigneeChanged);
received_event!(EventThreadRecovered, LivechatRecovered);
received_event!(EventCaseStatusChanged, CaseStatusChanged);
received_event!(UnknownEvent, Other);

/// An event sent from the client to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum OutboundEvent {
    SendMessage {
        thread_id: ThreadId,
        message_id: MessageId,
        text: String,
    },
    /// Ask the backend to close the contact tied to the thread.
    EndContact {
        thread_id: ThreadId,
        contact_id: Option<ContactId>,
    },
    /// Ask the backend to resend the full thread state.
    RecoverLivechatThread { thread_id: ThreadId },
    /// Ask the backend for a fresh access token.
    RefreshToken,
}

impl OutboundEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::SendMessage { .. } => "send_message",
            OutboundEvent::EndContact { .. } => "end_contact",
            OutboundEvent::RecoverLivechatThread { .. } => "recover_livechat_thread",
            OutboundEvent::RefreshToken => "refresh_token",
        }
    }
}
