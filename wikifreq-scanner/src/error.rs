use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Article not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} fetching '{title}'")]
    Status { title: String, status: u16 },

    #[error("Rate limited fetching '{title}'")]
    RateLimited {
        title: String,
        retry_after: Option<Duration>,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl FetchError {
    /// Transient failures worth another attempt: network trouble, timeouts,
    /// 429 and 5xx responses.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::HttpError(e) => e.is_timeout() || e.is_connect(),
            FetchError::Status { status, .. } => *status >= 500,
            FetchError::RateLimited { .. } | FetchError::Timeout(_) => true,
            FetchError::InvalidUrl(_) | FetchError::NotFound(_) | FetchError::ParseError(_) => {
                false
            }
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum TraversalError {
    #[error("failed to fetch seed article '{title}': {source}")]
    SeedFetch {
        title: String,
        #[source]
        source: FetchError,
    },
}

pub type Result<T> = std::result::Result<T, FetchError>;
