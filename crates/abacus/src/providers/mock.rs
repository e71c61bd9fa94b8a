use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::models::message::Message;
use crate::providers::base::{Provider, Usage};

/// A mock provider that returns pre-configured replies for testing
pub struct MockProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    fallback: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    seen: Mutex<Vec<usize>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of replies
    pub fn new<S: Into<String>>(replies: Vec<S>) -> Self {
        Self::scripted(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Replies and failures, returned in order
    pub fn scripted(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            fallback: None,
            delay: None,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Return the same reply forever
    pub fn repeating<S: Into<String>>(reply: S) -> Self {
        let mut provider = Self::scripted(Vec::new());
        provider.fallback = Some(reply.into());
        provider
    }

    /// Sleep before answering, to exercise cancellation and deadlines
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Length of the conversation sent on each call
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _model: &str,
        messages: &[Message],
    ) -> Result<(String, Usage), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(messages.len());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies.remove(0))
            }
        };

        match next {
            Some(reply) => reply.map(|text| (text, Usage::new(Some(10), Some(5), Some(15)))),
            None => Ok((self.fallback.clone().unwrap_or_default(), Usage::default())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_then_fallback() {
        let provider = MockProvider::scripted(vec![
            Ok("first".to_string()),
            Err(ProviderError::Api("overloaded".to_string())),
        ]);
        let messages = [Message::user("hi")];

        let (text, usage) = tokio_test::block_on(provider.complete("gpt-4o", &messages)).unwrap();
        assert_eq!(text, "first");
        assert_eq!(usage.total_tokens, Some(15));

        let err = tokio_test::block_on(provider.complete("gpt-4o", &messages)).unwrap_err();
        assert!(matches!(err, ProviderError::Api(_)));

        let (text, usage) = tokio_test::block_on(provider.complete("gpt-4o", &messages)).unwrap();
        assert_eq!(text, "");
        assert_eq!(usage, Usage::default());
        assert_eq!(provider.calls(), 3);
        assert_eq!(provider.seen_lengths(), vec![1, 1, 1]);
    }
}
