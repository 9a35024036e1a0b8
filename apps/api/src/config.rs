use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_LLM_PROVIDER: &str = "groq";
/// Value shipped in `.env.example`; treated the same as an unset key.
const PLACEHOLDER_SERVICE_KEY: &str = "your_service_role_key_here";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing. Datastore settings are
/// optional: without them the service runs with persistence disabled.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_provider: String,
    pub database: Option<DatabaseConfig>,
    pub reprobe_policy: ReprobePolicy,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    /// Privileged credential, applied as the connection password.
    pub service_key: String,
}

/// When a datastore marked unreachable gets checked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReprobePolicy {
    /// Only an explicit probe (startup or the probe endpoint) updates reachability.
    #[default]
    Never,
    /// A write that finds the datastore marked unreachable probes once before skipping.
    OnWrite,
}

impl FromStr for ReprobePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "on_write" => Ok(Self::OnWrite),
            other => anyhow::bail!("unknown DB_REPROBE policy '{other}' (expected never|on_write)"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            llm_provider: optional_env("LLM_PROVIDER")
                .unwrap_or_else(|| DEFAULT_LLM_PROVIDER.to_string()),
            database: database_config(
                optional_env("DATABASE_URL"),
                optional_env("DATABASE_SERVICE_KEY"),
            ),
            reprobe_policy: optional_env("DB_REPROBE")
                .map(|v| v.parse::<ReprobePolicy>())
                .transpose()
                .context("DB_REPROBE must be 'never' or 'on_write'")?
                .unwrap_or_default(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Both the URL and a real service key are needed to enable persistence.
fn database_config(url: Option<String>, service_key: Option<String>) -> Option<DatabaseConfig> {
    let url = url?;
    let service_key = service_key.filter(|k| k != PLACEHOLDER_SERVICE_KEY)?;
    Some(DatabaseConfig { url, service_key })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
