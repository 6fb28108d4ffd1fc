//! Conversation state
//!
//! An append-only message history. Appending yields a new state and leaves
//! the old one untouched, so a role can only ever extend what it was given.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{Message, Result, Role, WorldsmithError};

/// Ordered, append-only message history for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    /// Create a state seeded with `messages`
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Return a new state holding this history followed by `messages`
    #[must_use]
    pub fn append(&self, messages: impl IntoIterator<Item = Message>) -> Self {
        let mut next = self.messages.clone();
        next.extend(messages);
        Self { messages: next }
    }

    /// All messages in causal order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent message with the given role
    pub fn last_of(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role() == role)
    }

    /// Get message count
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Whether `self` extends `earlier` without altering any of its messages
    pub fn extends(&self, earlier: &ConversationState) -> bool {
        self.messages.len() >= earlier.messages.len()
            && self.messages[..earlier.messages.len()] == earlier.messages[..]
    }

    /// Verify that every tool message answers exactly one earlier tool call.
    pub fn check_tool_correlation(&self) -> Result<()> {
        let mut requested: HashSet<&str> = HashSet::new();
        let mut answered: HashSet<&str> = HashSet::new();

        for (index, message) in self.messages.iter().enumerate() {
            for call in message.tool_calls() {
                if !requested.insert(call.id.as_str()) {
                    return Err(WorldsmithError::Other(format!(
                        "tool call id '{}' is requested twice (message {})",
                        call.id, index
                    )));
                }
            }

            if let Some(call_id) = message.call_id() {
                if !requested.contains(call_id) {
                    return Err(WorldsmithError::Other(format!(
                        "tool message {} answers unknown call '{}'",
                        index, call_id
                    )));
                }
                if !answered.insert(call_id) {
                    return Err(WorldsmithError::Other(format!(
                        "tool call '{}' is answered twice (message {})",
                        call_id, index
                    )));
                }
            }
        }

        Ok(())
    }
}

impl From<Vec<Message>> for ConversationState {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

impl<'a> IntoIterator for &'a ConversationState {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ToolCall;
    use serde_json::json;

    #[test]
    fn test_append_leaves_original_untouched() {
        let seed = ConversationState::new(vec![Message::system("rules"), Message::human("hi")]);
        let next = seed.append(vec![Message::assistant("hello")]);

        assert_eq!(seed.len(), 2);
        assert_eq!(next.len(), 3);
        assert!(next.extends(&seed));
        assert!(!seed.extends(&next));
        assert_eq!(next.last(), Some(&Message::assistant("hello")));
    }

    #[test]
    fn test_last_of_role() {
        let state = ConversationState::new(vec![
            Message::human("first"),
            Message::assistant("a"),
            Message::human("second"),
        ]);
        assert_eq!(state.last_of(Role::Human).unwrap().content(), "second");
        assert!(state.last_of(Role::Tool).is_none());
    }

    #[test]
    fn test_tool_correlation() {
        let call = ToolCall::new("c1", "calculator", json!({"expression": "2+2"}));
        let good = ConversationState::new(vec![
            Message::assistant_with_tools("", vec![call]),
            Message::tool("c1", "4"),
        ]);
        assert!(good.check_tool_correlation().is_ok());

        let orphan = ConversationState::new(vec![Message::tool("c9", "4")]);
        assert!(orphan.check_tool_correlation().is_err());

        let twice = good.append(vec![Message::tool("c1", "4")]);
        assert!(twice.check_tool_correlation().is_err());
    }
}
