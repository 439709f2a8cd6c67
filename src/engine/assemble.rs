//! Submission assembler: final percentages plus a total become per-bucket
//! amount strings.

use crate::domain::{AllocationSet, Decimal, ValidationError};
use std::collections::BTreeMap;

/// Amount precision used on the wire.
pub const AMOUNT_DP: u32 = 2;

/// Submission precondition: a positive total and a complete allocation.
pub fn validate_for_submission(
    total_amount: Decimal,
    set: &AllocationSet,
) -> Result<(), ValidationError> {
    if !total_amount.is_positive() {
        return Err(ValidationError::NonPositiveAmount(total_amount));
    }
    if !set.is_complete() {
        return Err(ValidationError::IncompleteAllocation(set.total()));
    }
    Ok(())
}

/// `round(total * pct / 100, 2)` per bucket, without the submission checks.
///
/// Used for live previews while the user is still moving sliders. Rounded
/// amounts may drift from `total_amount` by a few hundredths; that is not
/// corrected. Fails only when a product does not fit in a `Decimal`.
pub fn bucket_amounts(
    total_amount: Decimal,
    set: &AllocationSet,
) -> Result<BTreeMap<String, String>, ValidationError> {
    set.buckets()
        .iter()
        .map(|b| {
            let amount = total_amount
                .checked_mul(b.percentage)
                .and_then(|product| product.checked_div(Decimal::hundred()))
                .ok_or(ValidationError::AmountTooLarge(total_amount))?;
            Ok((b.label.clone(), amount.to_fixed(AMOUNT_DP)))
        })
        .collect()
}

/// Validate, then map each bucket label to its amount string.
pub fn assemble(
    total_amount: Decimal,
    set: &AllocationSet,
) -> Result<BTreeMap<String, String>, ValidationError> {
    validate_for_submission(total_amount, set)?;
    bucket_amounts(total_amount, set)
}
