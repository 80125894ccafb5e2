// src/ingest/providers/mod.rs
pub mod eastmoney;
pub mod http;
pub mod sina;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::CrawlerConfig;
use crate::ingest::types::SourceAdapter;
use eastmoney::EastmoneyAdapter;
use http::HttpSettings;
use sina::SinaAdapter;

/// Build the enabled adapters. The list is fixed for the process lifetime.
pub fn build_adapters(cfg: &CrawlerConfig) -> Result<Vec<Arc<dyn SourceAdapter>>> {
    let http = HttpSettings::from(&cfg.http);
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = Vec::new();

    if cfg.sources.eastmoney.enabled {
        let a = EastmoneyAdapter::new(&cfg.sources.eastmoney, &http)
            .context("eastmoney adapter")?;
        adapters.push(Arc::new(a));
    }
    if cfg.sources.sina.enabled {
        let a = SinaAdapter::new(&cfg.sources.sina, &http).context("sina adapter")?;
        adapters.push(Arc::new(a));
    }

    if adapters.is_empty() {
        tracing::warn!("no sources enabled; cycles will be empty");
    }
    Ok(adapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sources_are_left_out() {
        let mut cfg = CrawlerConfig::default();
        let all = build_adapters(&cfg).unwrap();
        let names: Vec<_> = all.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["eastmoney", "sina"]);

        cfg.sources.eastmoney.enabled = false;
        let some = build_adapters(&cfg).unwrap();
        assert_eq!(some.len(), 1);
        assert_eq!(some[0].name(), "sina");
    }
}
