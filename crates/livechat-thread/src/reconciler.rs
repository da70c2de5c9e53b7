// SPDX-FileCopyrightText: 2026 Livechat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message list reconciliation and presentation filtering.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use livechat_core::{ChatThread, Message, MessageId};

/// Merges `incoming` into `current`.
///
/// The result holds one message per id, the copy from `incoming` winning
/// over `current` (and later copies winning within each list), sorted by
/// creation time with ties broken by id. Merging the same batch again
/// changes nothing.
pub fn merge_messages(current: &[Message], incoming: &[Message]) -> Vec<Message> {
    let mut by_id: HashMap<&MessageId, &Message> =
        HashMap::with_capacity(current.len() + incoming.len());
    for message in current.iter().chain(incoming) {
        by_id.insert(&message.id, message);
    }

    let mut merged: Vec<Message> = by_id.into_values().cloned().collect();
    merged.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

/// Removes the run of conversation-starter placeholders at the head of
/// `messages`. Placeholders after the first real message are kept.
pub fn drop_leading_conversation_starter(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .skip_while(|m| m.is_conversation_starter())
        .cloned()
        .collect()
}

/// The scroll token to present for `messages`: empty when the list is just
/// the placeholder, otherwise `existing`.
pub fn scroll_token_for_start(messages: &[Message], existing: &str) -> String {
    match messages {
        [only] if only.is_conversation_starter() => String::new(),
        _ => existing.to_string(),
    }
}

/// Read-only, presentation-ready view of a thread.
///
/// Produced by [`filtered`]; the conversation-starter placeholder is never
/// visible through a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSnapshot(Arc<ChatThread>);

impl ThreadSnapshot {
    /// Owned copy of the snapshot contents.
    pub fn to_thread(&self) -> ChatThread {
        self.0.as_ref().clone()
    }
}

impl Deref for ThreadSnapshot {
    type Target = ChatThread;

    fn deref(&self) -> &ChatThread {
        &self.0
    }
}

impl AsRef<ChatThread> for ThreadSnapshot {
    fn as_ref(&self) -> &ChatThread {
        &self.0
    }
}

/// Applies the presentation filter to `thread`.
pub fn filtered(thread: &ChatThread) -> ThreadSnapshot {
    let scroll_token = scroll_token_for_start(&thread.messages, &thread.scroll_token);
    let messages = drop_leading_conversation_starter(&thread.messages);
    ThreadSnapshot(Arc::new(ChatThread {
        messages,
        scroll_token,
        ..thread.clone()
    }))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use livechat_core::types::{MessageContent, MessageDirection};
    use livechat_core::{BEGIN_CONVERSATION_MESSAGE, ThreadId};
    use proptest::prelude::*;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
    }

    fn msg(id: &str, secs: i64, text: &str) -> Message {
        Message {
            id: MessageId::from(id),
            thread_id: ThreadId::from("t"),
            created_at: at(secs),
            direction: MessageDirection::ToAgent,
            author: None,
            content: MessageContent::Text {
                text: text.to_string(),
            },
        }
    }

    fn starter(id: &str, secs: i64) -> Message {
        msg(id, secs, BEGIN_CONVERSATION_MESSAGE)
    }

    fn ids(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn merge_sorts_by_time_then_id() {
        let current = vec![msg("b", 2, "two"), msg("z", 1, "one")];
        let incoming = vec![msg("a", 2, "two too"), msg("c", 3, "three")];
        let merged = merge_messages(&current, &incoming);
        assert_eq!(ids(&merged), vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn merge_incoming_copy_wins() {
        let current = vec![msg("a", 1, "draft")];
        let incoming = vec![msg("a", 1, "edited")];
        let merged = merge_messages(&current, &incoming);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].as_text(), Some("edited"));
    }

    #[test]
    fn merge_never_truncates_history() {
        let current: Vec<_> = (0..50).map(|i| msg(&format!("m{i:02}"), i, "x")).collect();
        let incoming = vec![msg("late", 100, "y")];
        assert_eq!(merge_messages(&current, &incoming).len(), 51);
    }

    #[test]
    fn starter_then_hello_drops_starter_keeps_token() {
        let messages = vec![starter("s", 0), msg("h", 1, "hello")];
        assert_eq!(ids(&drop_leading_conversation_starter(&messages)), vec!["h"]);
        assert_eq!(scroll_token_for_start(&messages, "tok"), "tok");
    }

    #[test]
    fn lone_starter_empties_list_and_token() {
        let messages = vec![starter("s", 0)];
        assert!(drop_leading_conversation_starter(&messages).is_empty());
        assert_eq!(scroll_token_for_start(&messages, "tok"), "");
    }

    #[test]
    fn non_leading_starter_is_kept() {
        let messages = vec![
            starter("s1", 0),
            starter("s2", 1),
            msg("h", 2, "hello"),
            starter("s3", 3),
        ];
        assert_eq!(
            ids(&drop_leading_conversation_starter(&messages)),
            vec!["h", "s3"]
        );
        assert_eq!(scroll_token_for_start(&messages, "tok"), "tok");
    }

    #[test]
    fn structured_message_is_never_a_starter() {
        let mut message = starter("s", 0);
        message.content = MessageContent::Structured {
            kind: "quick_replies".into(),
            payload: serde_json::json!({ "text": BEGIN_CONVERSATION_MESSAGE }),
        };
        assert_eq!(drop_leading_conversation_starter(&[message]).len(), 1);
    }

    #[test]
    fn filtered_applies_both_rules() {
        let thread = ChatThread::resumed(ThreadId::from("t"), vec![starter("s", 0)], "tok");
        let snapshot = filtered(&thread);
        assert!(snapshot.messages.is_empty());
        assert_eq!(snapshot.scroll_token, "");
        assert_eq!(snapshot.state, thread.state);
        // The source aggregate is untouched.
        assert_eq!(thread.messages.len(), 1);
    }

    fn arb_messages() -> impl Strategy<Value = Vec<Message>> {
        prop::collection::vec((0u8..12, 0i64..6, "[a-c]{1,3}"), 0..16).prop_map(|items| {
            items
                .into_iter()
                .map(|(id, secs, text)| msg(&format!("m{id}"), secs, &text))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(current in arb_messages(), incoming in arb_messages()) {
            let once = merge_messages(&current, &incoming);
            let twice = merge_messages(&once, &incoming);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn merge_output_is_sorted_and_unique(current in arb_messages(), incoming in arb_messages()) {
            let merged = merge_messages(&current, &incoming);
            for pair in merged.windows(2) {
                prop_assert!((pair[0].created_at, &pair[0].id) < (pair[1].created_at, &pair[1].id));
            }
            for message in &incoming {
                let found = merged.iter().find(|m| m.id == message.id);
                prop_assert!(found.is_some());
            }
        }
    }
}
