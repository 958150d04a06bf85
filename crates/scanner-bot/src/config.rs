//! Bot configuration.
//!
//! Resolved once at startup from environment variables (with defaults),
//! optionally overridden by a TOML file, and passed down as a value —
//! never read ambiently after startup.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use scanner_core::Pacing;
use serde::Deserialize;

const DEFAULT_API_URL: &str = "https://claudets.com/api";
const DEFAULT_STEP_DELAY_SECS: u64 = 3;
const DEFAULT_VERDICT_DELAY_SECS: u64 = 2;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Optional TOML overrides (`--config path`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub bot_token: Option<String>,
    pub api_url: Option<String>,
    pub step_delay_secs: Option<u64>,
    pub verdict_delay_secs: Option<u64>,
    pub fetch_timeout_secs: Option<u64>,
    pub poll_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token (from @BotFather).
    pub bot_token: String,
    /// Base URL of the analysis API.
    pub api_url: String,
    /// Reveal pacing for the sequencer.
    pub pacing: Pacing,
    /// Bounded wait for one analysis fetch.
    pub fetch_timeout: Duration,
    /// Long-poll window for getUpdates.
    pub poll_timeout: Duration,
}

impl BotConfig {
    /// Build the configuration. File values win over environment
    /// variables, which win over defaults. A missing bot token is a
    /// startup error.
    pub fn resolve(file: Option<FileConfig>) -> Result<Self> {
        let file = file.unwrap_or_default();

        let bot_token = file
            .bot_token
            .or_else(|| std::env::var("SCANNER_BOT_TOKEN").ok())
            .context(
                "Bot token not configured. Set SCANNER_BOT_TOKEN or bot_token in the config file",
            )?;

        let api_url = file
            .api_url
            .or_else(|| std::env::var("SCANNER_API_URL").ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let step_delay = resolve_secs(
            file.step_delay_secs,
            "SCANNER_STEP_DELAY_SECS",
            DEFAULT_STEP_DELAY_SECS,
        )?;
        let verdict_delay = resolve_secs(
            file.verdict_delay_secs,
            "SCANNER_VERDICT_DELAY_SECS",
            DEFAULT_VERDICT_DELAY_SECS,
        )?;
        let fetch_timeout = resolve_secs(
            file.fetch_timeout_secs,
            "SCANNER_FETCH_TIMEOUT_SECS",
            DEFAULT_FETCH_TIMEOUT_SECS,
        )?;
        let poll_timeout = resolve_secs(
            file.poll_timeout_secs,
            "SCANNER_POLL_TIMEOUT_SECS",
            DEFAULT_POLL_TIMEOUT_SECS,
        )?;

        Ok(Self {
            bot_token,
            api_url,
            pacing: Pacing {
                step_delay: Duration::from_secs(step_delay),
                verdict_delay: Duration::from_secs(verdict_delay),
            },
            fetch_timeout: Duration::from_secs(fetch_timeout),
            poll_timeout: Duration::from_secs(poll_timeout),
        })
    }
}

fn resolve_secs(file_value: Option<u64>, env_name: &str, default: u64) -> Result<u64> {
    if let Some(value) = file_value {
        return Ok(value);
    }
    match std::env::var(env_name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{env_name} must be an integer number of seconds")),
        Err(_) => Ok(default),
    }
}
