//! Transaction submission seam.
//!
//! Signing, fees, retries and chain state all belong to the implementation
//! behind `PayoutSubmitter`; this crate only hands over a script and its
//! arguments and waits for a terminal state.

use crate::domain::{Address, TxId};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;

pub mod script;

pub use script::{create_payout_script, pay_subscription_script, COMPUTE_LIMIT};

/// Everything the chain collaborator needs to create a payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub payer: Address,
    /// Two-decimal string, e.g. `"100.00"`.
    pub total_amount: String,
    pub allocations: BTreeMap<String, String>,
    pub script: String,
    pub compute_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Sealed,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("transaction rejected: {0}")]
    Rejected(String),
    #[error("transaction failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait PayoutSubmitter: Send + Sync + fmt::Debug {
    /// Hand the transaction to the chain; returns once it has an id.
    async fn submit(&self, request: &SubmissionRequest) -> Result<TxId, SubmitError>;

    /// Wait for the transaction to reach a terminal state.
    async fn await_sealed(&self, tx_id: &TxId) -> Result<TxStatus, SubmitError>;
}

/// Records requests and seals (or fails) every transaction. A rejecting
/// mock refuses every request before it gets a transaction id.
#[derive(Debug)]
pub struct MockSubmitter {
    submitted: Mutex<Vec<SubmissionRequest>>,
    outcome: TxStatus,
    rejection: Option<String>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::with_outcome(TxStatus::Sealed)
    }

    pub fn with_outcome(outcome: TxStatus) -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
            outcome,
            rejection: None,
        }
    }

    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            rejection: Some(reason.into()),
            ..Self::new()
        }
    }

    pub async fn submitted(&self) -> Vec<SubmissionRequest> {
        self.submitted.lock().await.clone()
    }
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PayoutSubmitter for MockSubmitter {
    async fn submit(&self, request: &SubmissionRequest) -> Result<TxId, SubmitError> {
        if let Some(reason) = &self.rejection {
            return Err(SubmitError::Rejected(reason.clone()));
        }
        self.submitted.lock().await.push(request.clone());
        Ok(TxId(uuid::Uuid::new_v4().simple().to_string()))
    }

    async fn await_sealed(&self, _tx_id: &TxId) -> Result<TxStatus, SubmitError> {
        Ok(self.outcome.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn request() -> SubmissionRequest {
        SubmissionRequest {
            payer: Address::from_str("0x0000000000000001").unwrap(),
            total_amount: "10.00".to_string(),
            allocations: BTreeMap::from([("A".to_string(), "10.00".to_string())]),
            script: String::new(),
            compute_limit: COMPUTE_LIMIT,
        }
    }

    #[tokio::test]
    async fn test_mock_submitter_records_requests() {
        let submitter = MockSubmitter::new();
        let tx = submitter.submit(&request()).await.unwrap();
        assert_eq!(tx.as_str().len(), 32);
        assert_eq!(submitter.submitted().await, vec![request()]);
        assert_eq!(submitter.await_sealed(&tx).await.unwrap(), TxStatus::Sealed);
    }

    #[tokio::test]
    async fn test_rejecting_submitter_records_nothing() {
        let submitter = MockSubmitter::rejecting("bad signature");
        assert_eq!(
            submitter.submit(&request()).await,
            Err(SubmitError::Rejected("bad signature".to_string()))
        );
        assert!(submitter.submitted().await.is_empty());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json["totalAmount"], "10.00");
        assert_eq!(json["computeLimit"], 200);
        assert_eq!(json["allocations"]["A"], "10.00");
    }
}
