// src/ingest/mod.rs
pub mod article;
pub mod error;
pub mod pipeline;
pub mod providers;
pub mod scheduler;
pub mod sink;
pub mod types;

pub use article::{Article, ArticleDraft, Symbol};
pub use error::{AdapterError, InvalidArticle, SinkError};
pub use pipeline::{CycleReport, IngestPipeline};
pub use scheduler::{CrawlScheduler, SchedulerHandle, SchedulerState};
pub use types::{RecordSink, SourceAdapter};

use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("crawl_cycles_total", "Completed ingestion cycles.");
        describe_counter!(
            "crawl_articles_fetched_total",
            "Articles produced by adapters."
        );
        describe_counter!(
            "crawl_articles_forwarded_total",
            "Articles accepted by the sink."
        );
        describe_counter!(
            "crawl_adapter_errors_total",
            "Adapter fetch/decode failures."
        );
        describe_counter!("crawl_sink_errors_total", "Failed sink writes.");
        describe_counter!(
            "crawl_items_skipped_total",
            "Upstream items dropped for missing id/title."
        );
        describe_histogram!("crawl_fetch_ms", "Adapter fetch+parse time in milliseconds.");
        describe_histogram!("crawl_cycle_ms", "Full cycle time in milliseconds.");
        describe_gauge!(
            "crawl_last_cycle_ts",
            "Unix ts when the last ingestion cycle finished."
        );
    });
}

/// Clean provider text: decode entities, strip tags, collapse whitespace.
///
/// Block-level tags become a space; inline tags (`<em>`, `<font>`, ...) are
/// dropped outright since they often sit inside a CJK word.
pub fn clean_text(s: &str) -> String {
    let decoded = html_escape::decode_html_entities(s);

    static RE_BLOCK: OnceCell<regex::Regex> = OnceCell::new();
    let re_block = RE_BLOCK.get_or_init(|| {
        regex::Regex::new(
            r"(?is)</?(?:p|div|br|hr|li|ul|ol|tr|td|th|table|h[1-6]|section|article|blockquote)\b[^>]*>",
        )
        .unwrap()
    });
    let spaced = re_block.replace_all(&decoded, " ");

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&spaced, "");

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&stripped, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_strips_tags_and_entities() {
        let s = "<p>Hello&nbsp;<b>world</b></p>";
        assert_eq!(clean_text(s), "Hello world");
    }

    #[test]
    fn clean_text_folds_whitespace() {
        assert_eq!(clean_text("A\u{00A0}\n\tB   C"), "A B C");
        assert_eq!(clean_text("   "), "");
    }

    #[test]
    fn clean_text_drops_inline_tags_without_spacing() {
        assert_eq!(clean_text("贵州<em>茅台</em>公告"), "贵州茅台公告");
        assert_eq!(
            clean_text("贵州<font color=red>茅台</font>：年度报告"),
            "贵州茅台：年度报告"
        );
    }

    #[test]
    fn clean_text_spaces_block_tags() {
        assert_eq!(clean_text("<p>第一段</p><p>第二段</p>"), "第一段 第二段");
        assert_eq!(clean_text("line<br/>next"), "line next");
        // `<b>` must not be mistaken for `<br>`.
        assert_eq!(clean_text("a<b>b</b>c"), "abc");
    }

    #[test]
    fn clean_text_keeps_cjk_punctuation() {
        assert_eq!(clean_text("关于“年度报告”的公告。"), "关于“年度报告”的公告。");
    }
}
