//! Historical payout events as returned by the transactions endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of payout lifecycle events.
///
/// The product skins name these differently on the wire; the aliases accept
/// both the payout and the subscription spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "PayoutCreated", alias = "SubscriptionCreated")]
    Created,
    #[serde(rename = "PayoutExecuted", alias = "SubscriptionPaid")]
    Executed,
    #[serde(rename = "PayoutCanceled", alias = "SubscriptionCanceled")]
    Canceled,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Created, EventKind::Executed, EventKind::Canceled];

    /// Event name emitted by the on-chain contract.
    pub fn contract_event_name(&self) -> &'static str {
        match self {
            EventKind::Created => "SubscriptionCreated",
            EventKind::Executed => "SubscriptionPaid",
            EventKind::Canceled => "SubscriptionCanceled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "subscriptionID", default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub payer: Option<String>,
    #[serde(default)]
    pub payee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<u64>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub transaction_id: String,
}

impl HistoricalEvent {
    /// Amount as a float for averaging. A missing amount reads as zero;
    /// anything that does not parse to a finite number is `None`.
    pub fn amount_f64(&self) -> Option<f64> {
        let raw = self.amount.as_deref().unwrap_or("0");
        raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

/// Stable sort, newest first.
pub fn sort_most_recent_first(events: &mut [HistoricalEvent]) {
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
