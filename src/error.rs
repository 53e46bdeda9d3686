use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// Why a proxy string was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected 4 fields, found {0}")]
    FieldCount(usize),
    #[error("neither the second nor the last field is numeric")]
    NoNumericField,
    #[error("port '{0}' is out of range")]
    InvalidPort(String),
}

/// Error type for proxy parsing and probing
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed proxy string
    #[error("proxy format failed: '{input}': {kind}")]
    Parse { input: String, kind: ParseErrorKind },
    /// Proxy list file could not be read
    #[error("cannot read proxy file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Proxy unreachable or refused the connection
    #[error("proxy connection failed: {0}")]
    ProxyConnection(String),
    #[error("no response within {0:?}")]
    ProbeTimeout(Duration),
    #[error("unexpected status code {0}")]
    UnexpectedStatus(u16),
    /// Client could not be configured for the proxy
    #[error("invalid proxy: {0}")]
    InvalidProxy(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("probe panicked: {0}")]
    TaskPanicked(String),
}

impl Error {
    /// Classify a reqwest error raised while talking through a proxy
    pub fn from_request(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::ProbeTimeout(timeout)
        } else if err.is_connect() {
            Error::ProxyConnection(err.to_string())
        } else if err.is_builder() {
            Error::InvalidProxy(err.to_string())
        } else {
            Error::Request(err.to_string())
        }
    }
}

/// Result type for proxy operations
pub type Result<T> = std::result::Result<T, Error>;
