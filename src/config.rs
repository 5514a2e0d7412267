use crate::consts::{DEFAULT_PORT, DEFAULT_VOGENT_API_BASE_URL};

use secrecy::SecretString;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Load `.env` into the process environment. A missing file is fine; a broken one is reported.
pub fn load_dotenv() {
    if let Some(e) = dotenv_problem(dotenvy::dotenv().map(|_| ())) {
        warn!(error=%e, "failed to load .env file");
    }
}

fn dotenv_problem(result: Result<(), dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

/// Process configuration, read once at startup and shared read-only afterwards.
#[derive(Debug)]
pub struct Config {
    pub vogent_api_key: SecretString,
    pub vogent_agent_id: String,
    pub vogent_phone_number_id: String,
    pub vogent_voice_id: String,
    pub vogent_webhook_secret: SecretString,
    /// Base URL of the Vogent REST API, without trailing slash.
    pub vogent_api_base_url: String,
    /// Downstream n8n workflow endpoint receiving extraction results.
    pub n8n_webhook_url: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::MissingEnvVar(key));

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "PORT",
                    message: e.to_string(),
                })?,
            None => DEFAULT_PORT,
        };

        let vogent_api_base_url = get("VOGENT_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_VOGENT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            vogent_api_key: SecretString::from(require("VOGENT_API_KEY")?),
            vogent_agent_id: require("VOGENT_AGENT_ID")?,
            vogent_phone_number_id: require("VOGENT_PHONE_NUMBER_ID")?,
            vogent_voice_id: require("VOGENT_VOICE_ID")?,
            vogent_webhook_secret: SecretString::from(require("VOGENT_WEBHOOK_SECRET")?),
            vogent_api_base_url,
            n8n_webhook_url: require("N8N_WEBHOOK_URL")?,
            port,
        })
    }
}
