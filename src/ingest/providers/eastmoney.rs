// src/ingest/providers/eastmoney.rs
//! Eastmoney listed-company announcements (JSON API).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use metrics::counter;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::EastmoneyConfig;
use crate::ingest::article::{Article, ArticleDraft, Symbol};
use crate::ingest::clean_text;
use crate::ingest::error::AdapterError;
use crate::ingest::providers::http::{build_client, get_text, HttpSettings};
use crate::ingest::types::SourceAdapter;

pub const SOURCE: &str = "eastmoney";
const CATEGORY: &str = "stock";
const NOTICE_URL_BASE: &str = "https://data.eastmoney.com/notices";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// China Standard Time; upstream times carry no zone.
const CST_OFFSET_SECS: i32 = 8 * 3600;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    data: Option<Data>,
}

#[derive(Debug, Default, Deserialize)]
struct Data {
    #[serde(default, rename = "annlist")]
    ann_list: Option<Vec<Ann>>,
}

#[derive(Debug, Deserialize)]
struct Ann {
    #[serde(default)]
    ann_id: String,
    #[serde(default)]
    ann_title: String,
    #[serde(default)]
    ann_content: String,
    #[serde(default)]
    ann_time: Option<String>,
    #[serde(default, rename = "stockList")]
    stock_list: Option<Vec<Stock>>,
}

#[derive(Debug, Deserialize)]
struct Stock {
    #[serde(default, rename = "secCode")]
    code: String,
    #[serde(default, rename = "secName")]
    name: String,
}

pub(crate) fn parse_ann_time(ts: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(ts.trim(), TIME_FORMAT).ok()?;
    let cst = FixedOffset::east_opt(CST_OFFSET_SECS)?;
    cst.from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

pub struct EastmoneyAdapter {
    client: Client,
    endpoint: String,
    page_size: u32,
    timeout: Duration,
}

impl EastmoneyAdapter {
    pub fn new(cfg: &EastmoneyConfig, http: &HttpSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(http, cfg.referer.as_deref())?,
            endpoint: cfg.endpoint.clone(),
            page_size: cfg.page_size,
            timeout: http.timeout,
        })
    }

    /// Decode a response body. `now` stands in for unparseable times.
    pub fn parse_body(body: &str, now: DateTime<Utc>) -> Result<Vec<Article>, AdapterError> {
        let resp: NewsResponse = serde_json::from_str(body).map_err(AdapterError::Decode)?;
        let items = resp.data.and_then(|d| d.ann_list).unwrap_or_default();

        let mut out = Vec::with_capacity(items.len());
        for it in items {
            let published_at = it.ann_time.as_deref().and_then(parse_ann_time);
            if published_at.is_none() {
                tracing::debug!(
                    source = SOURCE,
                    id = %it.ann_id,
                    raw = ?it.ann_time,
                    "unparseable ann_time, using processing time"
                );
            }
            let id = it.ann_id.trim().to_string();
            let draft = ArticleDraft {
                url: format!("{NOTICE_URL_BASE}/{id}.html"),
                id,
                title: it.ann_title,
                content: it.ann_content,
                summary: None,
                category: CATEGORY.to_string(),
                symbols: it
                    .stock_list
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|s| !s.code.trim().is_empty())
                    .map(|s| Symbol {
                        code: s.code.trim().to_string(),
                        name: clean_text(&s.name),
                    })
                    .collect(),
                published_at,
            };
            match draft.into_article(SOURCE, now) {
                Ok(a) => out.push(a),
                Err(e) => {
                    tracing::debug!(source = SOURCE, error = %e, "skipping announcement");
                    counter!("crawl_items_skipped_total", "source" => SOURCE).increment(1);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for EastmoneyAdapter {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch_and_parse(&self) -> Result<Vec<Article>, AdapterError> {
        let query = [
            ("page_size", self.page_size.to_string()),
            ("page_index", "1".to_string()),
        ];
        let body = get_text(&self.client, &self.endpoint, &query, self.timeout).await?;
        Self::parse_body(&body, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ann_time_is_read_as_china_time() {
        let dt = parse_ann_time("2024-03-15 18:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T10:30:00+00:00");
        assert!(parse_ann_time("2024/03/15").is_none());
        assert!(parse_ann_time("").is_none());
    }

    #[test]
    fn missing_data_is_empty_not_error() {
        let now = Utc::now();
        assert!(EastmoneyAdapter::parse_body(r#"{"data":null}"#, now)
            .unwrap()
            .is_empty());
        assert!(EastmoneyAdapter::parse_body(r#"{}"#, now).unwrap().is_empty());
    }

    #[test]
    fn items_without_title_are_skipped() {
        let body = r#"{"data":{"annlist":[
            {"ann_id":"A1","ann_title":"","ann_content":"x","ann_time":"2024-01-02 09:00:00"},
            {"ann_id":"A2","ann_title":"ok","ann_content":"y","ann_time":"2024-01-02 09:00:00"}
        ]}}"#;
        let out = EastmoneyAdapter::parse_body(body, Utc::now()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id(), "A2");
        assert_eq!(out[0].url(), "https://data.eastmoney.com/notices/A2.html");
    }

    #[test]
    fn inline_markup_in_title_leaves_no_gaps() {
        let body = r#"{"data":{"annlist":[
            {"ann_id":"A3","ann_title":"贵州<font color=red>茅台</font>：年度报告",
             "ann_content":"<p>营业收入<em>增长</em>18.04%</p>","ann_time":"2024-01-02 09:00:00",
             "stockList":[{"secCode":"600519","secName":"贵州茅台"},{"secCode":" ","secName":"x"}]}
        ]}}"#;
        let out = EastmoneyAdapter::parse_body(body, Utc::now()).unwrap();
        assert_eq!(out[0].title(), "贵州茅台：年度报告");
        assert_eq!(out[0].content(), "营业收入增长18.04%");
        assert_eq!(
            out[0].symbols(),
            [Symbol {
                code: "600519".into(),
                name: "贵州茅台".into()
            }]
        );
    }
}
