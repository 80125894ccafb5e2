// src/ingest/providers/sina.rs
//! Sina Finance roll feed (JSON variant of the roll page).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::SinaConfig;
use crate::ingest::article::{Article, ArticleDraft};
use crate::ingest::error::AdapterError;
use crate::ingest::providers::http::{build_client, get_text, HttpSettings};
use crate::ingest::types::SourceAdapter;

pub const SOURCE: &str = "sina";
const CATEGORY: &str = "finance";

#[derive(Debug, Deserialize)]
struct RollResponse {
    result: RollResult,
}

#[derive(Debug, Deserialize)]
struct RollResult {
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    data: Option<Vec<RollItem>>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
struct RollItem {
    #[serde(default)]
    docid: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    intro: String,
    #[serde(default)]
    url: String,
    /// Unix seconds; the feed sends it as a string, occasionally as a number.
    #[serde(default)]
    ctime: Option<Value>,
}

pub(crate) fn parse_ctime(v: &Value) -> Option<DateTime<Utc>> {
    let secs = match v {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}

pub struct SinaAdapter {
    client: Client,
    endpoint: String,
    page_size: u32,
    pageid: u32,
    lid: u32,
    timeout: Duration,
}

impl SinaAdapter {
    pub fn new(cfg: &SinaConfig, http: &HttpSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(http, cfg.referer.as_deref())?,
            endpoint: cfg.endpoint.clone(),
            page_size: cfg.page_size,
            pageid: cfg.pageid,
            lid: cfg.lid,
            timeout: http.timeout,
        })
    }

    /// Decode a response body. `now` stands in for unparseable times.
    pub fn parse_body(body: &str, now: DateTime<Utc>) -> Result<Vec<Article>, AdapterError> {
        let resp: RollResponse = serde_json::from_str(body).map_err(AdapterError::Decode)?;
        if let Some(st) = resp.result.status.as_ref().filter(|s| s.code != 0) {
            return Err(AdapterError::Upstream {
                code: st.code,
                message: st.msg.clone(),
            });
        }

        let items = resp.result.data.unwrap_or_default();
        let mut out = Vec::with_capacity(items.len());
        for it in items {
            let published_at = it.ctime.as_ref().and_then(parse_ctime);
            let draft = ArticleDraft {
                id: it.docid,
                title: it.title,
                content: it.intro,
                summary: None,
                category: CATEGORY.to_string(),
                url: it.url,
                symbols: Vec::new(),
                published_at,
            };
            match draft.into_article(SOURCE, now) {
                Ok(a) => out.push(a),
                Err(e) => {
                    tracing::debug!(source = SOURCE, error = %e, "skipping roll item");
                    counter!("crawl_items_skipped_total", "source" => SOURCE).increment(1);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for SinaAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch_and_parse(&self) -> Result<Vec<Article>, AdapterError> {
        let query = [
            ("pageid", self.pageid.to_string()),
            ("lid", self.lid.to_string()),
            ("num", self.page_size.to_string()),
            ("page", "1".to_string()),
        ];
        let body = get_text(&self.client, &self.endpoint, &query, self.timeout).await?;
        Self::parse_body(&body, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ctime_accepts_string_or_number() {
        let a = parse_ctime(&json!("1700000000")).unwrap();
        let b = parse_ctime(&json!(1700000000)).unwrap();
        assert_eq!(a, b);
        assert!(parse_ctime(&json!("yesterday")).is_none());
        assert!(parse_ctime(&json!(null)).is_none());
        assert!(parse_ctime(&json!(0)).is_none());
    }

    #[test]
    fn nonzero_status_is_upstream_error() {
        let body = r#"{"result":{"status":{"code":11,"msg":"invalid lid"},"data":[]}}"#;
        let err = SinaAdapter::parse_body(body, Utc::now()).unwrap_err();
        assert!(matches!(err, AdapterError::Upstream { code: 11, .. }));
    }
}
