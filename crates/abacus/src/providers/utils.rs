use serde_json::{json, Value};

use super::base::Usage;
use crate::errors::ProviderError;
use crate::models::message::Message;

/// Convert internal messages to OpenAI's chat `messages` array, preserving order
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role,
                "content": message.content,
            })
        })
        .collect()
}

/// Extract `choices[0].message.content` from a chat completion body
pub fn openai_response_to_text(response: &Value) -> Result<String, ProviderError> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(String::from)
            .unwrap_or_else(|| error.to_string());
        return Err(ProviderError::Api(message));
    }

    let choice = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .ok_or_else(|| ProviderError::MalformedBody("no choices in response".to_string()))?;

    choice
        .get("message")
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(String::from)
        .ok_or_else(|| {
            ProviderError::MalformedBody("choices[0].message.content is missing".to_string())
        })
}

/// Token usage, when the provider reports it
pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let input_tokens = usage
        .get("prompt_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let output_tokens = usage
        .get("completion_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32);

    let total_tokens = usage
        .get("total_tokens")
        .and_then(|v| v.as_i64())
        .map(|v| v as i32)
        .or_else(|| match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        });

    Usage::new(input_tokens, output_tokens, total_tokens)
}
