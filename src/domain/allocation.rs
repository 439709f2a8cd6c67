//! Buckets and allocation sets.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// One named share of a 100%-total allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub percentage: Decimal,
    /// Display only.
    #[serde(default)]
    pub color: String,
}

impl Bucket {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            percentage: Decimal::zero(),
            color: color.into(),
        }
    }
}

/// Reasons an allocation or its inputs are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("allocation must contain at least one bucket")]
    EmptyAllocation,
    #[error("duplicate bucket label: {0}")]
    DuplicateLabel(String),
    #[error("bucket {label} has percentage {value} outside [0, 100]")]
    PercentageOutOfRange { label: String, value: Decimal },
    #[error("allocation totals {0}%, which exceeds 100%")]
    OverAllocated(Decimal),
    #[error("allocate 100% before submitting (currently {0}%)")]
    IncompleteAllocation(Decimal),
    #[error("total amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),
    #[error("total amount {0} is too large to split")]
    AmountTooLarge(Decimal),
    #[error("at most {max} buckets are supported, got {got}")]
    TooManyBuckets { max: usize, got: usize },
    #[error("bucket index {index} out of range for {len} buckets")]
    BucketIndexOutOfRange { index: usize, len: usize },
    #[error("expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Ordered buckets whose percentages never total more than 100 at rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSet {
    buckets: Vec<Bucket>,
}

impl AllocationSet {
    /// Build a set with every bucket at 0%.
    pub fn zeroed(buckets: Vec<Bucket>) -> Result<Self, ValidationError> {
        let buckets = buckets
            .into_iter()
            .map(|b| Bucket {
                percentage: Decimal::zero(),
                ..b
            })
            .collect();
        Self::from_buckets(buckets)
    }

    /// Build a set from buckets that already carry percentages.
    pub fn from_buckets(buckets: Vec<Bucket>) -> Result<Self, ValidationError> {
        if buckets.is_empty() {
            return Err(ValidationError::EmptyAllocation);
        }

        let mut seen = HashSet::new();
        for bucket in &buckets {
            if !seen.insert(bucket.label.as_str()) {
                return Err(ValidationError::DuplicateLabel(bucket.label.clone()));
            }
            if bucket.percentage.is_negative() || bucket.percentage > Decimal::hundred() {
                return Err(ValidationError::PercentageOutOfRange {
                    label: bucket.label.clone(),
                    value: bucket.percentage,
                });
            }
        }

        let set = Self { buckets };
        let total = set.total();
        if total > Decimal::hundred() {
            return Err(ValidationError::OverAllocated(total));
        }
        Ok(set)
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn percentages(&self) -> Vec<Decimal> {
        self.buckets.iter().map(|b| b.percentage).collect()
    }

    pub fn total(&self) -> Decimal {
        self.buckets.iter().map(|b| b.percentage).sum()
    }

    /// Unallocated share, `100 - total`.
    pub fn remaining(&self) -> Decimal {
        Decimal::hundred() - self.total()
    }

    /// True when the set totals exactly 100.
    pub fn is_complete(&self) -> bool {
        self.total() == Decimal::hundred()
    }

    /// Sum of every bucket except `index`.
    pub fn others_sum(&self, index: usize) -> Decimal {
        self.buckets
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, b)| b.percentage)
            .sum()
    }

    /// Replace all percentages at once, keeping labels and colors.
    ///
    /// Callers are responsible for the at-rest invariant; values are only
    /// clamped into `[0, 100]` individually.
    pub(crate) fn with_percentages(&self, values: &[Decimal]) -> Result<Self, ValidationError> {
        if values.len() != self.buckets.len() {
            return Err(ValidationError::LengthMismatch {
                expected: self.buckets.len(),
                got: values.len(),
            });
        }
        let buckets = self
            .buckets
            .iter()
            .zip(values)
            .map(|(b, v)| Bucket {
                percentage: v.clamp_percentage(),
                ..b.clone()
            })
            .collect();
        Ok(Self { buckets })
    }

    pub(crate) fn set_percentage(&mut self, index: usize, value: Decimal) {
        if let Some(bucket) = self.buckets.get_mut(index) {
            bucket.percentage = value;
        }
    }
}
