// src/config/crawler.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "CRAWLER_CONFIG_PATH";
pub const ENV_INTERVAL_SECS: &str = "CRAWL_INTERVAL_SECS";
pub const ENV_METRICS_LISTEN: &str = "METRICS_LISTEN";
pub const DEFAULT_CONFIG_PATH: &str = "config/crawler.toml";

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn default_interval_secs() -> u64 {
    300
}
fn default_grace_secs() -> u64 {
    2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}
fn default_true() -> bool {
    true
}
fn default_page_size() -> u32 {
    50
}
fn default_eastmoney_endpoint() -> String {
    "https://np-anotice-stock.eastmoney.com/api/security/ann".to_string()
}
fn default_eastmoney_referer() -> Option<String> {
    Some("https://www.eastmoney.com/".to_string())
}
fn default_sina_endpoint() -> String {
    "https://feed.mix.sina.com.cn/api/roll/get".to_string()
}
fn default_sina_referer() -> Option<String> {
    Some("https://finance.sina.com.cn/".to_string())
}
fn default_sina_pageid() -> u32 {
    153
}
fn default_sina_lid() -> u32 {
    2509
}
fn default_sink_capacity() -> usize {
    crate::ingest::sink::DEFAULT_MEMORY_CAPACITY
}

fn default_sink_path() -> PathBuf {
    PathBuf::from("data/articles.jsonl")
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlerConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            shutdown_grace_secs: default_grace_secs(),
        }
    }
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default)]
    pub eastmoney: EastmoneyConfig,
    #[serde(default)]
    pub sina: SinaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EastmoneyConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_eastmoney_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_eastmoney_referer")]
    pub referer: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for EastmoneyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_eastmoney_endpoint(),
            referer: default_eastmoney_referer(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinaConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_sina_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_sina_referer")]
    pub referer: Option<String>,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_sina_pageid")]
    pub pageid: u32,
    #[serde(default = "default_sina_lid")]
    pub lid: u32,
}

impl Default for SinaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_sina_endpoint(),
            referer: default_sina_referer(),
            page_size: default_page_size(),
            pageid: default_sina_pageid(),
            lid: default_sina_lid(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Log,
    Memory,
    Jsonl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    #[serde(default = "default_sink_path")]
    pub path: PathBuf,
    /// Upper bound on records held by the memory sink.
    #[serde(default = "default_sink_capacity")]
    pub capacity: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::Log,
            path: default_sink_path(),
            capacity: default_sink_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// e.g. "127.0.0.1:9898"; no listener when absent.
    #[serde(default)]
    pub listen: Option<String>,
}

impl MetricsConfig {
    pub fn listen_addr(&self) -> Result<Option<SocketAddr>> {
        self.listen
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<SocketAddr>()
                    .with_context(|| format!("invalid metrics listen address {s:?}"))
            })
            .transpose()
    }
}

impl CrawlerConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: CrawlerConfig = toml::from_str(s).context("parsing crawler config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading crawler config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $CRAWLER_CONFIG_PATH
    /// 2) config/crawler.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(secs) = std::env::var(ENV_INTERVAL_SECS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.scheduler.interval_secs = secs;
        }
        if let Ok(listen) = std::env::var(ENV_METRICS_LISTEN) {
            self.metrics.listen = Some(listen);
        }
        self.sanitize();
    }

    fn sanitize(&mut self) {
        if self.scheduler.interval_secs == 0 {
            self.scheduler.interval_secs = default_interval_secs();
        }
        if self.http.timeout_secs == 0 {
            self.http.timeout_secs = default_timeout_secs();
        }
        if self.http.user_agent.trim().is_empty() {
            self.http.user_agent = default_user_agent();
        }
        if self.sources.eastmoney.page_size == 0 {
            self.sources.eastmoney.page_size = default_page_size();
        }
        if self.sources.sina.page_size == 0 {
            self.sources.sina.page_size = default_page_size();
        }
        if self.sink.capacity == 0 {
            self.sink.capacity = default_sink_capacity();
        }
    }
}
