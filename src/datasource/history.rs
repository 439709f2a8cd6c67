//! Client for the service's own `GET /transactions/{address}` route.

use super::{DataSourceError, EventSource};
use crate::domain::{Address, HistoricalEvent};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TransactionsBody {
    #[serde(default)]
    events: Vec<HistoricalEvent>,
}

/// Reads history through the transactions endpoint. No retries: a failed
/// fetch is reported to the caller, who leaves the allocation untouched.
#[derive(Debug, Clone)]
pub struct HistoryClient {
    client: Client,
    base_url: String,
}

impl HistoryClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl EventSource for HistoryClient {
    async fn fetch_events(
        &self,
        address: &Address,
    ) -> Result<Vec<HistoricalEvent>, DataSourceError> {
        let url = format!("{}/transactions/{}", self.base_url, address);
        debug!("Fetching history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DataSourceError::HttpError {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            });
        }

        let body = response
            .json::<TransactionsBody>()
            .await
            .map_err(|e| DataSourceError::ParseError(e.to_string()))?;
        Ok(body.events)
    }
}
