use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing {env_var}: set it in the environment, the config file, or pass {env_var}=<value>")]
    MissingEnvVar { env_var: String },

    #[error("Invalid API key in {env_var}")]
    InvalidApiKey { env_var: String },

    #[error("Invalid value for {env_var}: {reason}")]
    InvalidValue { env_var: String, reason: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Settings fields are the lowercase form of the variable names users set
pub fn to_env_var(field: &str) -> String {
    field.to_uppercase()
}
