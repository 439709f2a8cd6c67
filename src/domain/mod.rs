//! Domain types for payout splits.
//!
//! This module provides:
//! - Lossless numeric handling via the Decimal wrapper
//! - Domain primitives: Address, Contract, TxId
//! - Buckets and allocation sets with their at-rest invariant
//! - Historical payout events read from the indexer

pub mod allocation;
pub mod decimal;
pub mod event;
pub mod primitives;

pub use allocation::{AllocationSet, Bucket, ValidationError};
pub use decimal::Decimal;
pub use event::{sort_most_recent_first, EventKind, HistoricalEvent};
pub use primitives::{Address, AddressParseError, Contract, TxId};
