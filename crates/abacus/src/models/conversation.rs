use serde::Serialize;

use super::message::Message;
use crate::errors::{AgentError, AgentResult};

/// Ordered, append-only log of the messages exchanged during a run.
///
/// A conversation is seeded with a system prompt and the user's question, so it is
/// never empty. Messages are never edited or removed, and once the run reaches a
/// terminal state no further messages may be appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    messages: Vec<Message>,
    #[serde(skip)]
    terminated: bool,
}

impl Conversation {
    pub fn seed<S, U>(system_prompt: S, user_prompt: U) -> Self
    where
        S: Into<String>,
        U: Into<String>,
    {
        Conversation {
            messages: vec![Message::system(system_prompt), Message::user(user_prompt)],
            terminated: false,
        }
    }

    pub fn append(&mut self, message: Message) -> AgentResult<()> {
        if self.terminated {
            return Err(AgentError::InvalidState(format!(
                "cannot append a {} message to a terminated conversation",
                message.role
            )));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Mark the conversation as finished. Calling this more than once has no further effect.
    pub fn terminate(&mut self) {
        self.terminated = true;
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
