//! Slider constraint resolver.
//!
//! Keeps the "total <= 100" invariant when a single bucket is moved. The
//! invariant wins over the requested value.

use crate::domain::{AllocationSet, Decimal, ValidationError};

/// Turn raw slider input into a percentage. NaN and negatives become 0,
/// anything above 100 becomes 100. Never fails.
pub fn clamp_percentage(raw: f64) -> Decimal {
    if raw.is_nan() {
        return Decimal::zero();
    }
    Decimal::from_f64(raw.clamp(0.0, 100.0)).unwrap_or_else(Decimal::zero)
}

/// Set bucket `index` to `new_value`, capped at whatever the other buckets
/// leave free. Other buckets are untouched.
pub fn adjust(
    set: &AllocationSet,
    index: usize,
    new_value: Decimal,
) -> Result<AllocationSet, ValidationError> {
    check_index(set, index)?;

    let requested = new_value.clamp_percentage();
    let others = set.others_sum(index);
    let value = if others + requested > Decimal::hundred() {
        (Decimal::hundred() - others).max(Decimal::zero())
    } else {
        requested
    };

    let mut next = set.clone();
    next.set_percentage(index, value);
    Ok(next)
}

/// Largest value bucket `index` may currently take.
pub fn slider_max(set: &AllocationSet, index: usize) -> Result<Decimal, ValidationError> {
    check_index(set, index)?;
    Ok((Decimal::hundred() - set.others_sum(index)).max(Decimal::zero()))
}

fn check_index(set: &AllocationSet, index: usize) -> Result<(), ValidationError> {
    if index >= set.len() {
        return Err(ValidationError::BucketIndexOutOfRange {
            index,
            len: set.len(),
        });
    }
    Ok(())
}
