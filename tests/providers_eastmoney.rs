// tests/providers_eastmoney.rs
use chrono::{TimeZone, Utc};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use newscrawler::config::crawler::BROWSER_USER_AGENT;
use newscrawler::config::EastmoneyConfig;
use newscrawler::ingest::providers::eastmoney::EastmoneyAdapter;
use newscrawler::ingest::providers::http::HttpSettings;
use newscrawler::ingest::{AdapterError, SourceAdapter};

const FIXTURE: &str = include_str!("fixtures/eastmoney_ann.json");
const ANN_PATH: &str = "/api/security/ann";

fn adapter_for(server: &MockServer, http: HttpSettings) -> EastmoneyAdapter {
    let cfg = EastmoneyConfig {
        endpoint: format!("{}{ANN_PATH}", server.uri()),
        ..Default::default()
    };
    EastmoneyAdapter::new(&cfg, &http).expect("build adapter")
}

#[tokio::test]
async fn parses_announcements_fixture() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ANN_PATH))
        .and(query_param("page_size", "50"))
        .and(query_param("page_index", "1"))
        .and(header("referer", "https://www.eastmoney.com/"))
        .and(header("user-agent", BROWSER_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string(FIXTURE))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = adapter_for(&server, HttpSettings::default());
    let before = Utc::now();
    let items = adapter.fetch_and_parse().await.expect("eastmoney parse ok");
    let after = Utc::now();

    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|a| a.source() == "eastmoney"));
    assert!(items.iter().all(|a| a.category() == "stock"));

    let first = &items[0];
    assert_eq!(first.id(), "AN202403151234567890");
    assert_eq!(
        first.url(),
        "https://data.eastmoney.com/notices/AN202403151234567890.html"
    );
    assert_eq!(first.symbols().len(), 1);
    assert_eq!(first.symbols()[0].code, "600519");
    assert_eq!(first.symbols()[0].name, "贵州茅台");
    assert!(!first.content().contains("<p>"));
    assert_eq!(first.summary(), first.content());
    assert_eq!(
        first.published_at(),
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    );

    // Unparseable ann_time keeps the item with the processing time.
    let third = &items[2];
    assert_eq!(third.id(), "AN202403151234567892");
    assert!(third.published_at() >= before && third.published_at() <= after);
    assert!(third.symbols().is_empty());
}

#[tokio::test]
async fn non_success_status_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ANN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = adapter_for(&server, HttpSettings::default())
        .fetch_and_parse()
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Status(503)), "got {err:?}");
    assert_eq!(err.kind(), "protocol");
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ANN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = adapter_for(&server, HttpSettings::default())
        .fetch_and_parse()
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn slow_upstream_hits_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ANN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(FIXTURE)
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let http = HttpSettings::default().with_timeout(Duration::from_millis(100));
    let err = adapter_for(&server, http)
        .fetch_and_parse()
        .await
        .unwrap_err();
    assert!(matches!(err, AdapterError::Timeout(_)), "got {err:?}");
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let cfg = EastmoneyConfig {
        endpoint: format!("http://127.0.0.1:1{ANN_PATH}"),
        ..Default::default()
    };
    let adapter = EastmoneyAdapter::new(&cfg, &HttpSettings::default()).unwrap();
    let err = adapter.fetch_and_parse().await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn empty_list_yields_no_articles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ANN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data":{"annlist":[]}}"#))
        .mount(&server)
        .await;

    let items = adapter_for(&server, HttpSettings::default())
        .fetch_and_parse()
        .await
        .unwrap();
    assert!(items.is_empty());
}
