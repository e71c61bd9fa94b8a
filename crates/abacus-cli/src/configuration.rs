use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use abacus::agent::DEFAULT_MAX_STEPS;
use abacus::providers::configs::{OpenAiProviderConfig, DEFAULT_MODEL, DEFAULT_TIMEOUT, OPENAI_HOST};
use config::{Config, File};
use serde::Deserialize;

use crate::error::{to_env_var, ConfigError};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const MODEL_NAME: &str = "MODEL_NAME";
pub const OPENAI_HOST_VAR: &str = "OPENAI_HOST";
pub const MAX_STEPS: &str = "MAX_STEPS";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

/// Every variable the CLI resolves, in the order they are documented
pub const KNOWN_VARS: [&str; 5] = [
    OPENAI_API_KEY,
    MODEL_NAME,
    OPENAI_HOST_VAR,
    MAX_STEPS,
    REQUEST_TIMEOUT_SECS,
];

#[derive(Deserialize)]
struct RawSettings {
    openai_api_key: Option<String>,
    #[serde(default = "default_model")]
    model_name: String,
    #[serde(default = "default_host")]
    openai_host: String,
    #[serde(default = "default_max_steps")]
    max_steps: usize,
    #[serde(default = "default_timeout_secs")]
    request_timeout_secs: u64,
}

#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub host: String,
    pub max_steps: usize,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &abacus::providers::configs::redact(&self.api_key))
            .field("model", &self.model)
            .field("host", &self.host)
            .field("max_steps", &self.max_steps)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Settings {
    /// Resolve settings. Environment variables win over the settings file, which wins
    /// over `NAME=value` command-line arguments, which win over the defaults.
    pub fn load(args: &[(String, String)], file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for (name, value) in args {
            builder = builder.set_default(name.to_lowercase(), value.as_str())?;
        }

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }

        for name in KNOWN_VARS {
            if let Ok(value) = env::var(name) {
                builder = builder.set_override(name.to_lowercase(), value)?;
            }
        }

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::validate(raw)
    }

    fn validate(raw: RawSettings) -> Result<Self, ConfigError> {
        let api_key = raw.openai_api_key.ok_or_else(|| ConfigError::MissingEnvVar {
            env_var: to_env_var("openai_api_key"),
        })?;
        if api_key.len() <= 5 || api_key == OPENAI_API_KEY {
            return Err(ConfigError::InvalidApiKey {
                env_var: OPENAI_API_KEY.to_string(),
            });
        }
        if raw.max_steps == 0 {
            return Err(ConfigError::InvalidValue {
                env_var: to_env_var("max_steps"),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Settings {
            api_key,
            model: raw.model_name,
            host: raw.openai_host,
            max_steps: raw.max_steps,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        })
    }

    pub fn provider_config(&self) -> OpenAiProviderConfig {
        OpenAiProviderConfig::new(self.api_key.clone())
            .with_host(self.host.clone())
            .with_timeout(self.request_timeout)
    }
}

/// `~/.config/abacus`, created on demand
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(".config").join("abacus"))
}

pub fn default_config_file() -> Option<PathBuf> {
    config_dir().ok().map(|dir| dir.join("config.toml"))
}

/// Split raw positional arguments into `NAME=value` settings and the remaining words
pub fn split_assignments(args: &[String]) -> (Vec<String>, Vec<(String, String)>) {
    let mut words = Vec::new();
    let mut assignments = Vec::new();
    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) if is_var_name(name) => {
                assignments.push((name.to_string(), value.to_string()));
            }
            _ => words.push(arg.clone()),
        }
    }
    (words, assignments)
}

fn is_var_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_host() -> String {
    OPENAI_HOST.to_string()
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}
