use relay_common::error::{RelayError, RelayResult};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub accounts_path: String,
    pub sink_url: String,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    /// Loads `.env` file if present, then reads required vars.
    pub fn from_env() -> RelayResult<Self> {
        // Best-effort .env load; ignore if missing
        let _ = dotenvy::dotenv();

        Ok(Self {
            accounts_path: get_var("ACCOUNTS_PATH")?,
            sink_url: get_var("SINK_URL")?,
            log_level: get_var_or("LOG_LEVEL", "info"),
        })
    }
}

fn get_var(key: &str) -> RelayResult<String> {
    env::var(key).map_err(|_| RelayError::Config(format!("{key} is required but not set")))
}

fn get_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}
