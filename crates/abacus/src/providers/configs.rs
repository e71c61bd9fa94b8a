use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Models known to work well with the action format. Any other identifier is passed through as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum KnownModel {
    #[strum(serialize = "gpt-4o")]
    Gpt4o,
    #[strum(serialize = "gpt-4o-mini")]
    Gpt4oMini,
    #[strum(serialize = "o1")]
    O1,
}

impl KnownModel {
    pub fn id(&self) -> String {
        self.to_string()
    }

    pub fn description(&self) -> &'static str {
        match self {
            KnownModel::Gpt4o => "A large model with a very high level of intelligence and strong performance, at a higher cost per token",
            KnownModel::Gpt4oMini => "A small model, not quite as capable as gpt-4o, but faster and less expensive per token",
            KnownModel::O1 => "A reasoning model; slower and uses more tokens to think, but capable of multi-step planning",
        }
    }
}

#[derive(Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OpenAiProviderConfig {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            host: OPENAI_HOST.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Keeps the key out of logs and panics
impl std::fmt::Debug for OpenAiProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProviderConfig")
            .field("host", &self.host)
            .field("api_key", &redact(&self.api_key))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Show only the first few characters of a secret
pub fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}***", visible)
}
