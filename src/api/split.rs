use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{parse_address, AppState};
use crate::domain::{AllocationSet, Bucket, Decimal, ValidationError};
use crate::engine::{self, SplitProfile, Suggestion};
use crate::error::{AppError, SplitError};
use crate::submit::{create_payout_script, SubmissionRequest, COMPUTE_LIMIT};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub buckets: Vec<Bucket>,
    pub index: usize,
    /// Raw slider value; NaN and negatives clamp to 0.
    pub value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustResponse {
    pub buckets: Vec<Bucket>,
    pub remaining: Decimal,
}

pub async fn adjust(Json(req): Json<AdjustRequest>) -> Result<Json<AdjustResponse>, AppError> {
    let set = AllocationSet::from_buckets(req.buckets)?;
    let next = engine::adjust(&set, req.index, engine::clamp_percentage(req.value))?;
    Ok(Json(AdjustResponse {
        remaining: next.remaining(),
        buckets: next.buckets().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestRequest {
    pub address: String,
    pub profile: Option<String>,
    pub bucket_count: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestResponse {
    pub address: String,
    pub profile: String,
    pub labels: Vec<String>,
    #[serde(flatten)]
    pub suggestion: Suggestion,
}

pub async fn suggest(
    State(state): State<AppState>,
    Json(req): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let address = parse_address(&req.address)?;
    let profile = match req.profile.as_deref() {
        None | Some("") => state.profile.clone(),
        Some(name) => SplitProfile::by_name(name)
            .map(|p| p.with_thresholds(state.profile.thresholds))
            .ok_or_else(|| AppError::BadRequest(format!("Unknown profile: {}", name)))?,
    };
    let bucket_count = req.bucket_count.unwrap_or(profile.buckets.len());
    if bucket_count > engine::MAX_BUCKETS {
        return Err(ValidationError::TooManyBuckets {
            max: engine::MAX_BUCKETS,
            got: bucket_count,
        }
        .into());
    }

    let events = state
        .events
        .fetch_events(&address)
        .await
        .map_err(SplitError::Fetch)?;
    let suggestion = engine::suggest(&profile, &events, bucket_count)?;

    Ok(Json(SuggestResponse {
        address: address.to_string(),
        labels: profile
            .buckets
            .iter()
            .map(|(label, _)| label.clone())
            .take(bucket_count)
            .collect(),
        profile: profile.name,
        suggestion,
    }))
}

/// Amount as sent by a form: either a JSON number or a decimal string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(f64),
}

impl AmountInput {
    fn to_decimal(&self) -> Result<Decimal, AppError> {
        let parsed = match self {
            AmountInput::Text(s) => Decimal::from_str_canonical(s).ok(),
            AmountInput::Number(n) => Decimal::from_f64(*n),
        };
        parsed.ok_or_else(|| AppError::BadRequest("Invalid total amount".to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub payer: String,
    pub total_amount: AmountInput,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleResponse {
    pub payer: String,
    pub total_amount: String,
    pub allocations: BTreeMap<String, String>,
    pub script: String,
    pub compute_limit: u64,
}

impl From<SubmissionRequest> for AssembleResponse {
    fn from(req: SubmissionRequest) -> Self {
        Self {
            payer: req.payer.to_string(),
            total_amount: req.total_amount,
            allocations: req.allocations,
            script: req.script,
            compute_limit: req.compute_limit,
        }
    }
}

pub async fn assemble(
    State(state): State<AppState>,
    Json(req): Json<AssembleRequest>,
) -> Result<Json<AssembleResponse>, AppError> {
    let payer = parse_address(&req.payer)?;
    let total = req.total_amount.to_decimal()?;
    let set = AllocationSet::from_buckets(req.buckets)?;
    let allocations = engine::assemble(total, &set)?;

    let request = SubmissionRequest {
        payer,
        total_amount: total.to_fixed(engine::assemble::AMOUNT_DP),
        allocations,
        script: create_payout_script(&state.config.contract),
        compute_limit: COMPUTE_LIMIT,
    };
    Ok(Json(request.into()))
}
