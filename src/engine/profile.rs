//! Split profiles: bucket templates and tier weights for one product skin.

use crate::domain::{AllocationSet, Bucket, ValidationError};
use serde::{Deserialize, Serialize};

/// Which weight vector a history average selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Mid,
    High,
}

/// Average-amount boundaries between tiers. `avg < mid` is Low,
/// `mid <= avg < high` is Mid, anything else High.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierThresholds {
    pub mid: f64,
    pub high: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            mid: 100.0,
            high: 300.0,
        }
    }
}

impl TierThresholds {
    pub fn tier_for(&self, average: f64) -> Tier {
        if average < self.mid {
            Tier::Low
        } else if average < self.high {
            Tier::Mid
        } else {
            Tier::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierWeights {
    pub low: Vec<u32>,
    pub mid: Vec<u32>,
    pub high: Vec<u32>,
}

impl TierWeights {
    pub fn for_tier(&self, tier: Tier) -> &[u32] {
        match tier {
            Tier::Low => &self.low,
            Tier::Mid => &self.mid,
            Tier::High => &self.high,
        }
    }
}

/// One configurable allocation engine setup: bucket names, colors,
/// thresholds and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitProfile {
    pub name: String,
    pub buckets: Vec<(String, String)>,
    pub thresholds: TierThresholds,
    pub weights: TierWeights,
}

impl SplitProfile {
    /// Team payouts across members.
    pub fn guild() -> Self {
        Self {
            name: "guild".to_string(),
            buckets: vec![
                ("Member A".to_string(), "#31D183".to_string()),
                ("Member B".to_string(), "#4F8DFD".to_string()),
                ("Member C".to_string(), "#FFC53D".to_string()),
            ],
            thresholds: TierThresholds::default(),
            weights: TierWeights {
                low: vec![50, 30, 20],
                mid: vec![40, 35, 25],
                high: vec![30, 40, 30],
            },
        }
    }

    /// Salary split across savings, investments and spending.
    pub fn subs() -> Self {
        Self {
            name: "subs".to_string(),
            buckets: vec![
                ("Savings (Vault)".to_string(), "#31D183".to_string()),
                ("DeFi Investments (Pool)".to_string(), "#4F8DFD".to_string()),
                ("Spending (Wallet)".to_string(), "#FFC53D".to_string()),
            ],
            thresholds: TierThresholds::default(),
            weights: TierWeights {
                low: vec![45, 35, 20],
                mid: vec![35, 40, 25],
                high: vec![25, 35, 40],
            },
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "guild" => Some(Self::guild()),
            "subs" => Some(Self::subs()),
            _ => None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: TierThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Fresh allocation with every bucket at 0%.
    pub fn empty_allocation(&self) -> Result<AllocationSet, ValidationError> {
        AllocationSet::zeroed(
            self.buckets
                .iter()
                .map(|(label, color)| Bucket::new(label.clone(), color.clone()))
                .collect(),
        )
    }
}
