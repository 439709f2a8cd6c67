//! Event indexer client (FindLabs-style REST API).

use super::decode::decode_indexer_event;
use super::{DataSourceError, EventSource};
use crate::domain::{sort_most_recent_first, Address, Contract, EventKind, HistoricalEvent};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use chrono::Utc;
use futures::future::try_join_all;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, warn};

/// Page size requested per event type.
pub const EVENTS_LIMIT: u32 = 100;

/// Credentials for the indexer, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndexerAuth {
    #[default]
    None,
    Bearer(String),
    Basic { user: String, pass: String },
}

impl IndexerAuth {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            IndexerAuth::None => request,
            IndexerAuth::Bearer(token) => request.bearer_auth(token),
            IndexerAuth::Basic { user, pass } => request.basic_auth(user, Some(pass)),
        }
    }
}

/// Fetches payout events for an account by querying each event type in
/// parallel and merging the results.
#[derive(Debug, Clone)]
pub struct IndexerClient {
    client: Client,
    base_url: String,
    network: String,
    contract: Contract,
    auth: IndexerAuth,
    retry_budget: Duration,
}

impl IndexerClient {
    pub fn new(base_url: String, network: String, contract: Contract) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            network,
            contract,
            auth: IndexerAuth::None,
            retry_budget: Duration::from_secs(30),
        }
    }

    pub fn with_auth(mut self, auth: IndexerAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Upper bound on time spent retrying transient failures. Zero disables
    /// retries.
    pub fn with_retry_budget(mut self, budget: Duration) -> Self {
        self.retry_budget = budget;
        self
    }

    pub fn contract(&self) -> &Contract {
        &self.contract
    }

    async fn get_events_json(
        &self,
        address: &Address,
        event_type: &str,
    ) -> Result<serde_json::Value, DataSourceError> {
        let url = format!("{}/api/v1/events", self.base_url);
        let limit = EVENTS_LIMIT.to_string();
        let query = [
            ("network", self.network.as_str()),
            ("contract_address", self.contract.address.as_str()),
            ("event_type", event_type),
            ("account_address", address.as_str()),
            ("limit", limit.as_str()),
        ];
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_budget),
            ..Default::default()
        };

        retry(backoff, || async {
            let request = self.auth.apply(self.client.get(&url).query(&query));
            let response = request.send().await.map_err(|e| {
                backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await
    }
}

/// Decode the `events` array of one response. A response without one
/// contributes nothing.
pub fn decode_events_page(page: &serde_json::Value, kind: EventKind) -> Vec<HistoricalEvent> {
    let now = Utc::now();
    match page.get("events").and_then(|v| v.as_array()) {
        Some(items) => items
            .iter()
            .map(|raw| decode_indexer_event(raw, kind, now))
            .collect(),
        None => {
            warn!("Indexer response for {:?} has no events array", kind);
            Vec::new()
        }
    }
}

#[async_trait]
impl EventSource for IndexerClient {
    async fn fetch_events(
        &self,
        address: &Address,
    ) -> Result<Vec<HistoricalEvent>, DataSourceError> {
        debug!(
            "Fetching events for address={}, contract={}.{}",
            address, self.contract.address, self.contract.name
        );

        let pages = try_join_all(EventKind::ALL.iter().map(|kind| async move {
            let event_type = self.contract.event_type(kind.contract_event_name());
            self.get_events_json(address, &event_type)
                .await
                .map(|page| (*kind, page))
        }))
        .await?;

        let mut events: Vec<HistoricalEvent> = pages
            .iter()
            .flat_map(|(kind, page)| decode_events_page(page, *kind))
            .collect();
        sort_most_recent_first(&mut events);

        debug!("Fetched {} events for address={}", events.len(), address);
        Ok(events)
    }
}
