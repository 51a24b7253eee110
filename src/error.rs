use std::io;

use thiserror::Error;

/// Error type returned by a [`RouterApi`](crate::router_client::RouterApi) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum UsageError {
    #[error("zone {0:?} is duplicated")]
    DuplicatedZone(String),
    #[error("at least one --zone is required")]
    NoZone,
    #[error("at least one --prefix is required")]
    NoPrefix,
    #[error("could not parse --percentile-set: invalid token {token:?}")]
    InvalidPercentile { token: String },
    #[error("could not parse --percentile-set: {token:?} is not in (0, 100]")]
    PercentileOutOfRange { token: String },
    #[error("--time {points} is out of range")]
    InvalidTime { points: u32 },
    #[error("failed to fetch routers in zone {zone}: {source}")]
    Fetch {
        zone: String,
        #[source]
        source: BoxError,
    },
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write result: {0}")]
    Io(#[from] io::Error),
}

impl UsageError {
    /// Configuration errors are detected before anything is fetched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            UsageError::DuplicatedZone(_)
                | UsageError::NoZone
                | UsageError::NoPrefix
                | UsageError::InvalidPercentile { .. }
                | UsageError::PercentileOutOfRange { .. }
                | UsageError::InvalidTime { .. }
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("invalid query: {0}")]
    Parse(String),
    #[error("{0}")]
    Runtime(String),
    #[error("{0} not found in result")]
    NotFound(String),
}
