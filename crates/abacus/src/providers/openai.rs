use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::base::{Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{get_usage, messages_to_openai_spec, openai_response_to_text};
use crate::errors::ProviderError;
use crate::models::message::Message;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.config.timeout)
        } else {
            ProviderError::Transport(err)
        }
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        tracing::info!("response status: {}", status);

        if status.is_success() {
            response.json().await.map_err(|e| self.transport_error(e))
        } else {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!("failed to read error response body: {}", e);
                    format!("<unreadable body: {}>", e)
                }
            };
            tracing::info!("response body: {}", body);
            Err(ProviderError::Status { status, body })
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
    ) -> Result<(String, Usage), ProviderError> {
        let payload = json!({
            "model": model,
            "messages": messages_to_openai_spec(messages),
        });
        tracing::debug!("request payload: {}", payload);

        let response = self.post(payload).await?;

        let text = openai_response_to_text(&response)?;
        let usage = get_usage(&response);

        Ok((text, usage))
    }
}
