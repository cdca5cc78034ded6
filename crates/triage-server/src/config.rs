use anyhow::{anyhow, Result};

/// Server configuration, read once from the process environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub db_path: String,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY is not set"))?;
        Ok(Self {
            bind: env_or("TRIAGE_BIND", "0.0.0.0:8000"),
            db_path: env_or("TRIAGE_DB", "triage.db"),
            model: env_or("TRIAGE_MODEL", "gpt-4o-mini"),
            api_key,
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
