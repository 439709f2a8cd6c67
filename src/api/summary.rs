use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{parse_address, AppState};
use crate::engine::{self, CategoryShares, MemberShare};
use crate::error::{AppError, SplitError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub address: String,
    pub event_count: usize,
    pub shares: CategoryShares,
    /// Newest executed payout, two decimals.
    pub latest_amount: Option<String>,
    pub total_distributed: String,
    pub member_shares: Vec<MemberShare>,
    pub active_members: usize,
    pub next_payment: Option<DateTime<Utc>>,
}

pub async fn get_summary(
    Path(address): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SummaryResponse>, AppError> {
    let address = parse_address(&address)?;
    let events = state
        .events
        .fetch_events(&address)
        .await
        .map_err(SplitError::Fetch)?;

    Ok(Json(SummaryResponse {
        address: address.to_string(),
        event_count: events.len(),
        shares: engine::category_shares(&events),
        latest_amount: engine::latest_executed_amount(&events).map(|a| a.to_fixed(2)),
        total_distributed: engine::total_distributed(&events).to_fixed(2),
        member_shares: engine::member_shares(&events),
        active_members: engine::active_members(&events),
        next_payment: engine::next_payment(&events),
    }))
}
