use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::{parse_address, AppState};
use crate::domain::HistoricalEvent;
use crate::error::AppError;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EventsSource {
    Findlabs,
    Fallback,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionsResponse {
    pub address: String,
    pub events: Vec<HistoricalEvent>,
    pub count: usize,
    pub source: EventsSource,
}

/// Payout history for an account. The indexer being down is not an error
/// for callers: they get an empty list tagged `fallback`.
pub async fn get_transactions(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, AppError> {
    let address = parse_address(&address)?;

    let events = match state.events.fetch_events(&address).await {
        Ok(events) => events,
        Err(e) => {
            warn!("Indexer fetch failed for {}: {}", address, e);
            Vec::new()
        }
    };

    let source = if events.is_empty() {
        EventsSource::Fallback
    } else {
        EventsSource::Findlabs
    };

    Ok(Json(TransactionsResponse {
        address: address.to_string(),
        count: events.len(),
        events,
        source,
    }))
}
