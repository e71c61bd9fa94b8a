use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::models::message::Message;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }

    /// Fold another step's usage into this running total
    pub fn accumulate(&mut self, other: &Usage) {
        fn add(total: Option<i32>, step: Option<i32>) -> Option<i32> {
            match (total, step) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                (a, b) => a.or(b),
            }
        }
        self.input_tokens = add(self.input_tokens, other.input_tokens);
        self.output_tokens = add(self.output_tokens, other.output_tokens);
        self.total_tokens = add(self.total_tokens, other.total_tokens);
    }
}

/// Base trait for AI providers (OpenAI and compatible endpoints)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send the whole conversation to `model` and return the text of its top choice
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<(String, Usage), ProviderError>;
}
