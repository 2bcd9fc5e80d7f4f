use std::path::PathBuf;

use thiserror::Error;

/// Every way a chat request can fail to produce a reply.
///
/// The controller renders all variants the same way; the distinction only
/// matters for logs and tests.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat endpoint unreachable: {0}")]
    Network(#[source] reqwest::Error),
    #[error("chat endpoint returned HTTP {0}")]
    Status(u16),
    #[error("chat endpoint returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("chat endpoint response has no string `reply` field")]
    MissingReply,
    #[error("chat request ended before a reply was read")]
    Interrupted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api_url '{value}': {source}")]
    InvalidUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("api_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
