// src/ingest/providers/http.rs
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::config::crawler::BROWSER_USER_AGENT;
use crate::ingest::error::AdapterError;

/// Outbound request settings shared by adapters. Each adapter still builds
/// its own client from them.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: BROWSER_USER_AGENT.to_string(),
        }
    }
}

impl HttpSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&HttpConfig> for HttpSettings {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(cfg.timeout_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

pub fn build_client(settings: &HttpSettings, referer: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    if let Some(r) = referer {
        headers.insert(
            REFERER,
            HeaderValue::from_str(r).with_context(|| format!("invalid referer {r:?}"))?,
        );
    }
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .default_headers(headers)
        .timeout(settings.timeout)
        .build()
        .context("building http client")
}

/// GET `url` with `query` and return the body of a 2xx response.
pub async fn get_text<Q: serde::Serialize + ?Sized>(
    client: &Client,
    url: &str,
    query: &Q,
    timeout: Duration,
) -> Result<String, AdapterError> {
    let map_err = |e: reqwest::Error| {
        if e.is_timeout() {
            AdapterError::Timeout(timeout)
        } else {
            AdapterError::Transport(e)
        }
    };

    let resp = client.get(url).query(query).send().await.map_err(map_err)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(AdapterError::Status(status.as_u16()));
    }
    resp.text().await.map_err(map_err)
}
