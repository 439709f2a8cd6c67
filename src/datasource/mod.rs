//! Data source abstraction for fetching historical payout events.

use crate::domain::{Address, HistoricalEvent};
use async_trait::async_trait;
use std::fmt;

pub mod decode;
pub mod history;
pub mod indexer;
pub mod mock;

pub use history::HistoryClient;
pub use indexer::{IndexerAuth, IndexerClient};
pub use mock::MockEventSource;

/// Source of historical payout events for an account.
///
/// Implementations return events ordered newest first.
#[async_trait]
pub trait EventSource: Send + Sync + fmt::Debug {
    /// Fetch created, executed and canceled events involving `address`.
    async fn fetch_events(&self, address: &Address)
        -> Result<Vec<HistoricalEvent>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// Non-2xx response
    HttpError { status: u16, message: String },
    /// Invalid JSON or unexpected shape
    ParseError(String),
    /// Rate limit exceeded after retries
    RateLimited,
    Other(String),
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
            DataSourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for DataSourceError {}
