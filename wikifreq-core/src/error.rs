use thiserror::Error;
use wikifreq_scanner::{FetchError, TraversalError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(i64),
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("failed to fetch seed article '{title}': {source}")]
    SeedFetchFailure {
        title: String,
        #[source]
        source: FetchError,
    },

    #[error("percentile must be between 0 and 100, got {0}")]
    InvalidPercentile(i64),

    #[error("depth must not be negative, got {0}")]
    InvalidDepth(i64),

    #[error("article title must not be empty")]
    InvalidArticle,
}

impl RequestError {
    /// Rejected before any article was fetched.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(self, RequestError::SeedFetchFailure { .. })
    }
}

impl From<TraversalError> for RequestError {
    fn from(err: TraversalError) -> Self {
        match err {
            TraversalError::SeedFetch { title, source } => {
                RequestError::SeedFetchFailure { title, source }
            }
        }
    }
}

impl From<FilterError> for RequestError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidPercentile(p) => RequestError::InvalidPercentile(p),
        }
    }
}
