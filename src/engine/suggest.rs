//! History-based split suggestion.
//!
//! Averages the most recent executed payouts, picks a tier from the profile,
//! and turns that tier's weights into integer percentages totalling 100.

use crate::domain::{Decimal, EventKind, HistoricalEvent, ValidationError};
use crate::engine::profile::{SplitProfile, Tier};
use crate::engine::residual::fix_residual;
use serde::Serialize;

/// How many executed payouts feed the average.
pub const HISTORY_WINDOW: usize = 12;

/// Past this, some bucket is bound to get a 0% share.
pub const MAX_BUCKETS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub targets: Vec<u32>,
    pub average: f64,
    pub tier: Tier,
    /// Amounts that parsed and went into the average.
    pub sample_size: usize,
}

/// Mean of the first `HISTORY_WINDOW` executed amounts, assuming
/// `events` is ordered newest first. Unparseable amounts are skipped.
pub fn recent_average(events: &[HistoricalEvent]) -> (f64, usize) {
    let amounts: Vec<f64> = events
        .iter()
        .filter(|e| e.kind == EventKind::Executed)
        .take(HISTORY_WINDOW)
        .filter_map(HistoricalEvent::amount_f64)
        .collect();

    if amounts.is_empty() {
        return (0.0, 0);
    }
    let avg = amounts.iter().sum::<f64>() / amounts.len() as f64;
    (avg, amounts.len())
}

/// Scale `weights` to `bucket_count` integer percentages that sum to 100.
///
/// Longer weight vectors are truncated, shorter ones padded with zeros.
/// All-zero weights fall back to an even split.
pub fn normalize_weights(
    weights: &[u32],
    bucket_count: usize,
) -> Result<Vec<u32>, ValidationError> {
    if bucket_count == 0 {
        return Err(ValidationError::EmptyAllocation);
    }
    if bucket_count > MAX_BUCKETS {
        return Err(ValidationError::TooManyBuckets {
            max: MAX_BUCKETS,
            got: bucket_count,
        });
    }

    let mut fitted: Vec<u32> = weights.iter().copied().take(bucket_count).collect();
    fitted.resize(bucket_count, 0);
    if fitted.iter().all(|w| *w == 0) {
        fitted = vec![1; bucket_count];
    }

    let total: Decimal = fitted.iter().map(|w| Decimal::from(*w)).sum();
    let rounded: Vec<Decimal> = fitted
        .iter()
        .map(|w| (Decimal::from(*w) / total * Decimal::hundred()).round_half_up(0))
        .collect();

    Ok(fix_residual(&rounded)
        .iter()
        .map(|d| d.to_u32().unwrap_or(0))
        .collect())
}

/// Suggest target percentages for `bucket_count` buckets from recent history.
pub fn suggest(
    profile: &SplitProfile,
    events: &[HistoricalEvent],
    bucket_count: usize,
) -> Result<Suggestion, ValidationError> {
    let (average, sample_size) = recent_average(events);
    let tier = profile.thresholds.tier_for(average);
    let targets = normalize_weights(profile.weights.for_tier(tier), bucket_count)?;

    Ok(Suggestion {
        targets,
        average,
        tier,
        sample_size,
    })
}
