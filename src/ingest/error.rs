// src/ingest/error.rs
use std::time::Duration;
use thiserror::Error;

/// Adapter-level failure: the adapter produced no articles this cycle.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status code: {0}")]
    Status(u16),

    #[error("parse response failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("provider returned error code {code}: {message}")]
    Upstream { code: i64, message: String },
}

impl AdapterError {
    /// Label used for logs and the `kind` metric dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            AdapterError::Transport(_) | AdapterError::Timeout(_) => "transport",
            AdapterError::Status(_) | AdapterError::Upstream { .. } => "protocol",
            AdapterError::Decode(_) => "decode",
        }
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("write rejected: {0}")]
    Rejected(String),
}

/// An item that cannot become an `Article`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidArticle {
    #[error("article is missing `{0}`")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(AdapterError::Timeout(Duration::from_secs(30)).kind(), "transport");
        assert_eq!(AdapterError::Status(502).kind(), "protocol");
        let upstream = AdapterError::Upstream {
            code: 1,
            message: "bad".into(),
        };
        assert_eq!(upstream.kind(), "protocol");
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AdapterError::Decode(bad_json).kind(), "decode");
    }
}
