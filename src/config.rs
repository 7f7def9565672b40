// src/config.rs
//! Runtime configuration: optional TOML file, environment wins.
//!
//! Precedence mirrors the deployment reality: `config/radar.toml` for stable
//! local settings, env vars (CI secrets) on top. Credentials and the webhook
//! are required; everything else has defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::sources::catalog::{DEFAULT_ITEM_ENDPOINT, DEFAULT_PERFORMER_ENDPOINT};

pub const DEFAULT_CONFIG_PATH: &str = "config/radar.toml";
pub const ENV_CONFIG_PATH: &str = "RADAR_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub api_id: String,
    pub affiliate_id: String,
    pub webhook_url: String,

    pub catalog_endpoint: String,
    pub performer_search_endpoint: String,
    /// Blog root; empty disables blog subscriptions and category resolution.
    pub blog_base_url: String,

    /// Directory holding the subscription and ledger tables.
    pub data_dir: String,

    pub http_timeout_secs: u64,
    pub pace_secs: u64,
    pub cache_ttl_secs: u64,

    pub fetch_hits: usize,
    pub notify_scan_cap: usize,
    pub display_cap: usize,
    pub require_sample_media: bool,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            affiliate_id: String::new(),
            webhook_url: String::new(),
            catalog_endpoint: DEFAULT_ITEM_ENDPOINT.to_string(),
            performer_search_endpoint: DEFAULT_PERFORMER_ENDPOINT.to_string(),
            blog_base_url: String::new(),
            data_dir: "data".to_string(),
            http_timeout_secs: 15,
            pace_secs: 1,
            cache_ttl_secs: 300,
            fetch_hits: 30,
            notify_scan_cap: 30,
            display_cap: 5,
            require_sample_media: false,
        }
    }
}

fn env_string(cfg: &mut String, key: &str) {
    if let Ok(v) = std::env::var(key) {
        if !v.trim().is_empty() {
            *cfg = v.trim().to_string();
        }
    }
}

fn env_u64(cfg: &mut u64, key: &str) {
    if let Ok(v) = std::env::var(key) {
        if let Ok(n) = v.trim().parse() {
            *cfg = n;
        }
    }
}

impl RadarConfig {
    /// File (if present) then env overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut cfg = if path.exists() {
            Self::from_path(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_env(&mut self) {
        env_string(&mut self.api_id, "DMM_API_ID");
        env_string(&mut self.affiliate_id, "DMM_AFFILIATE_ID");
        env_string(&mut self.webhook_url, "DISCORD_WEBHOOK_URL");
        env_string(&mut self.blog_base_url, "BLOG_BASE_URL");
        env_string(&mut self.data_dir, "RADAR_DATA_DIR");
        env_u64(&mut self.pace_secs, "RADAR_PACE_SECS");
        env_u64(&mut self.cache_ttl_secs, "RADAR_CACHE_TTL_SECS");
        env_u64(&mut self.http_timeout_secs, "RADAR_HTTP_TIMEOUT_SECS");
    }

    /// Fatal precondition check before a run is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.api_id.is_empty() || self.affiliate_id.is_empty() {
            return Err(anyhow!("DMM_API_ID / DMM_AFFILIATE_ID are not configured"));
        }
        if self.webhook_url.is_empty() {
            return Err(anyhow!("DISCORD_WEBHOOK_URL is not configured"));
        }
        Ok(())
    }
}
