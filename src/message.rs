//! Chat message types
//!
//! A run sends one fixed, ordered conversation: a system message followed by
//! a user message. The conversation is built once and never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// System prompt sent when none is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
/// User prompt sent when none is configured
pub const DEFAULT_USER_PROMPT: &str = "What are 3 things to visit in Seattle?";

/// Role tag of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// A single role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Build the run's conversation: `[system, user]`
pub fn conversation(system_prompt: &str, user_prompt: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_order() {
        let messages = conversation(DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::System);
        assert_eq!(messages[0].content(), "You are a helpful assistant.");
        assert_eq!(messages[1].role(), Role::User);
        assert_eq!(messages[1].content(), "What are 3 things to visit in Seattle?");
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(ChatMessage::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }

    #[test]
    fn test_role_display_matches_wire_tag() {
        for role in [Role::System, Role::User, Role::Assistant] {
            let wire = serde_json::to_value(role).unwrap();
            assert_eq!(wire, serde_json::Value::String(role.to_string()));
        }
    }
}
