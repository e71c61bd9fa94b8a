use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::role::Role;

/// Prefix for every tool result fed back to the model
pub const OBSERVATION_PREFIX: &str = "Observation: ";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: String,
}

impl Message {
    fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: content.into(),
        }
    }

    /// Create a new system message with the current timestamp
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user message with the current timestamp
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// A user message carrying a tool observation back to the model
    pub fn observation<S: AsRef<str>>(text: S) -> Self {
        Self::user(format!("{}{}", OBSERVATION_PREFIX, text.as_ref()))
    }

    pub fn is_observation(&self) -> bool {
        self.role == Role::User && self.content.starts_with(OBSERVATION_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constructors_set_role() {
        assert_eq!(Message::system("s").role, Role::System);
        assert_eq!(Message::user("u").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
    }

    #[test]
    fn test_observation() {
        let message = Message::observation("4.0");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.content, "Observation: 4.0");
        assert!(message.is_observation());
        assert!(!Message::user("What is 2 + 2?").is_observation());
    }

    #[test]
    fn test_message_serialization() -> anyhow::Result<()> {
        let message = Message::assistant("Action: Calculator\nAction Input: 2 + 2");
        let value = serde_json::to_value(&message)?;
        assert_eq!(value["role"], json!("assistant"));
        assert_eq!(value["content"], json!("Action: Calculator\nAction Input: 2 + 2"));

        let back: Message = serde_json::from_value(value)?;
        assert_eq!(back, message);
        Ok(())
    }
}
