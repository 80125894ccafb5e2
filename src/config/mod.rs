pub mod crawler;

pub use crawler::{
    CrawlerConfig, EastmoneyConfig, HttpConfig, MetricsConfig, SchedulerConfig, SinaConfig,
    SinkConfig, SinkKind, SourcesConfig,
};
