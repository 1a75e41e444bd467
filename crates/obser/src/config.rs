// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::cli::Command;

/// Command-line client for the operations dashboard API.
#[derive(Debug, Parser)]
#[command(name = "obser", version, about)]
pub struct Config {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Log format (text or json).
    #[arg(long, env = "OBSER_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "OBSER_LOG_LEVEL", default_value = "warn", global = true)]
    pub log_level: String,

    /// Selected-project file. Defaults to `selection.json` under the state dir.
    #[arg(long, env = "OBSER_SELECTION_FILE", global = true)]
    pub selection_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.client.validate()?;
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!("--log-format must be text or json, got {:?}", self.log_format);
        }
        Ok(())
    }
}

/// Connection settings for the API client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Backend base URL (scheme, host, port; no trailing path).
    #[arg(long, default_value = "http://127.0.0.1:8000", env = "OBSER_API_URL", global = true)]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 30_000, env = "OBSER_TIMEOUT_MS", global = true)]
    pub timeout_ms: u64,

    /// Token refresh timeout in milliseconds. Expiry counts as a failed refresh.
    #[arg(long, default_value_t = 15_000, env = "OBSER_REFRESH_TIMEOUT_MS", global = true)]
    pub refresh_timeout_ms: u64,

    /// Token file. Defaults to `tokens.json` under the state dir.
    #[arg(long, env = "OBSER_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Defaults for talking to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: 30_000,
            refresh_timeout_ms: 15_000,
            token_file: None,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| anyhow::anyhow!("invalid --base-url {:?}: {e}", self.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("--base-url must be http or https, got {}", url.scheme());
        }
        if self.timeout_ms == 0 {
            anyhow::bail!("--timeout-ms must be positive");
        }
        if self.refresh_timeout_ms == 0 {
            anyhow::bail!("--refresh-timeout-ms must be positive");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
