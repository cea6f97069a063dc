use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where the curated working sets are mirrored between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurationStoreBackend {
    File,
    Redis,
    Memory,
}

impl FromStr for CurationStoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => bail!("CURATION_STORE must be one of file, redis, memory (got '{other}')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a local-development default except `REDIS_URL`,
/// which is required only for the redis curation store.
#[derive(Debug, Clone)]
pub struct Config {
    pub panel_service_url: String,
    pub question_bank_url: String,
    pub candidate_service_url: String,
    pub curation_store: CurationStoreBackend,
    pub curation_store_dir: PathBuf,
    pub redis_url: Option<String>,
    pub http_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let curation_store: CurationStoreBackend = env_or("CURATION_STORE", "file").parse()?;
        let redis_url = std::env::var("REDIS_URL").ok();
        if curation_store == CurationStoreBackend::Redis && redis_url.is_none() {
            bail!("Required environment variable 'REDIS_URL' is not set (CURATION_STORE=redis)");
        }

        Ok(Config {
            panel_service_url: env_or("PANEL_SERVICE_URL", "http://localhost:5002"),
            question_bank_url: env_or("QUESTION_BANK_URL", "http://localhost:5005"),
            candidate_service_url: env_or("CANDIDATE_SERVICE_URL", "http://localhost:5000"),
            curation_store,
            curation_store_dir: PathBuf::from(env_or("CURATION_STORE_DIR", ".panel-cache")),
            redis_url,
            http_timeout: Duration::from_secs(
                env_or("HTTP_TIMEOUT_SECS", "60")
                    .parse::<u64>()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
