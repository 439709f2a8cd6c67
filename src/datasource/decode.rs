//! Tolerant decoding of raw indexer events.
//!
//! Indexer payloads put contract fields either under `event_data` or under
//! `data`. Lookups try the sections in `PAYLOAD_SECTIONS` order and skip
//! values that are null, empty strings, `false` or zero, so an empty
//! `event_data.amount` falls through to `data.amount`.

use crate::domain::{EventKind, HistoricalEvent};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Where contract fields may live in a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadSection {
    EventData,
    Data,
}

impl PayloadSection {
    pub fn key(&self) -> &'static str {
        match self {
            PayloadSection::EventData => "event_data",
            PayloadSection::Data => "data",
        }
    }
}

/// Lookup order for contract fields.
pub const PAYLOAD_SECTIONS: [PayloadSection; 2] = [PayloadSection::EventData, PayloadSection::Data];

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First present value of `field` across the payload sections, with the
/// section it came from.
pub fn payload_field<'a>(raw: &'a Value, field: &str) -> Option<(PayloadSection, &'a Value)> {
    PAYLOAD_SECTIONS.iter().find_map(|section| {
        raw.get(section.key())
            .and_then(|s| s.get(field))
            .filter(|v| is_present(v))
            .map(|v| (*section, v))
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn payload_string(raw: &Value, field: &str) -> Option<String> {
    payload_field(raw, field).and_then(|(_, v)| value_to_string(v))
}

/// Integer payload field, `0` when absent or unparseable.
fn payload_u64(raw: &Value, field: &str) -> u64 {
    payload_field(raw, field)
        .and_then(|(_, v)| value_to_u64(v))
        .unwrap_or(0)
}

fn top_level_string(raw: &Value, field: &str) -> Option<String> {
    raw.get(field)
        .filter(|v| is_present(v))
        .and_then(value_to_string)
}

fn parse_timestamp(raw: &Value, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now)
}

/// Stable id when the indexer omits the transaction id.
fn fallback_event_id(kind: EventKind, raw: &Value) -> String {
    fn hash_var(hasher: &mut Sha256, data: &str) {
        hasher.update((data.len() as u32).to_le_bytes());
        hasher.update(data.as_bytes());
    }

    let mut hasher = Sha256::new();
    hash_var(&mut hasher, kind.contract_event_name());
    for field in ["subscriptionID", "payer", "payee", "amount"] {
        hash_var(&mut hasher, &payload_string(raw, field).unwrap_or_default());
    }
    hash_var(
        &mut hasher,
        &top_level_string(raw, "block_height").unwrap_or_default(),
    );
    hash_var(
        &mut hasher,
        &top_level_string(raw, "event_index").unwrap_or_default(),
    );

    let hash = hasher.finalize();
    format!("hash:{}", hex::encode(&hash[..16]))
}

/// Decode one raw indexer event of a known kind. Never fails: missing
/// fields degrade to `None`, zero, or `now` for the timestamp.
pub fn decode_indexer_event(raw: &Value, kind: EventKind, now: DateTime<Utc>) -> HistoricalEvent {
    let transaction_id = top_level_string(raw, "transaction_id").unwrap_or_default();
    let event_index = top_level_string(raw, "event_index").unwrap_or_else(|| "0".to_string());
    let id = if transaction_id.is_empty() {
        fallback_event_id(kind, raw)
    } else {
        format!("{}-{}", transaction_id, event_index)
    };

    let (amount, interval, grace_period) = match kind {
        EventKind::Created => (
            payload_string(raw, "amount"),
            Some(payload_u64(raw, "interval")),
            Some(payload_u64(raw, "gracePeriod")),
        ),
        EventKind::Executed => (payload_string(raw, "amount"), None, None),
        EventKind::Canceled => (None, None, None),
    };

    HistoricalEvent {
        id,
        kind,
        subscription_id: payload_string(raw, "subscriptionID"),
        payer: payload_string(raw, "payer"),
        payee: payload_string(raw, "payee"),
        amount,
        interval,
        grace_period,
        timestamp: parse_timestamp(raw, now),
        block_height: raw.get("block_height").and_then(value_to_u64).unwrap_or(0),
        transaction_id,
    }
}
