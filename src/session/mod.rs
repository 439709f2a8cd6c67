//! One user's split-editing session.
//!
//! A session exclusively owns its allocation. Two counters enforce
//! last-write-wins:
//! - `revision` moves on every user edit and every new transition; an
//!   animation frame is applied only while the revision it started under is
//!   still current.
//! - `request_seq` moves on every history request; only the newest request's
//!   result is applied.

pub mod animate;
pub mod compounding;

pub use animate::{animate_to_suggestion, run_transition, TransitionOutcome};
pub use compounding::{CompoundingTask, CompoundingToggle, SharedBalance};

use crate::datasource::{DataSourceError, EventSource};
use crate::domain::{Address, AllocationSet, Contract, Decimal, HistoricalEvent, TxId};
use crate::engine::{self, SplitProfile, Suggestion};
use crate::error::SplitError;
use crate::submit::{
    create_payout_script, PayoutSubmitter, SubmissionRequest, SubmitError, TxStatus,
    COMPUTE_LIMIT,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub type SharedSession = Arc<Mutex<SplitSession>>;

/// Handle for one history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTicket {
    seq: u64,
    address: Address,
}

impl HistoryTicket {
    pub fn address(&self) -> &Address {
        &self.address
    }
}

/// Handle for one in-flight transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionToken(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub tx_id: TxId,
    pub allocations: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SplitSession {
    profile: SplitProfile,
    allocation: AllocationSet,
    total_amount: Decimal,
    payer: Option<Address>,
    revision: u64,
    request_seq: u64,
    optimizing: bool,
}

impl SplitSession {
    pub fn new(profile: SplitProfile) -> Result<Self, SplitError> {
        let allocation = profile.empty_allocation()?;
        Ok(Self {
            profile,
            allocation,
            total_amount: Decimal::zero(),
            payer: None,
            revision: 0,
            request_seq: 0,
            optimizing: false,
        })
    }

    pub fn shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn profile(&self) -> &SplitProfile {
        &self.profile
    }

    pub fn allocation(&self) -> &AllocationSet {
        &self.allocation
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn payer(&self) -> Option<&Address> {
        self.payer.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True while a transition is animating the allocation.
    pub fn is_optimizing(&self) -> bool {
        self.optimizing
    }

    pub fn connect(&mut self, payer: Address) {
        self.payer = Some(payer);
    }

    /// Disconnecting also invalidates any history request in flight.
    pub fn disconnect(&mut self) {
        self.payer = None;
        self.request_seq += 1;
    }

    fn user_edit(&mut self) {
        self.revision += 1;
        self.optimizing = false;
    }

    /// Move one slider. Supersedes any running transition.
    pub fn adjust(&mut self, index: usize, value: Decimal) -> Result<&AllocationSet, SplitError> {
        let next = engine::adjust(&self.allocation, index, value)?;
        self.allocation = next;
        self.user_edit();
        Ok(&self.allocation)
    }

    /// Move one slider from raw input (NaN and negatives clamp to 0).
    pub fn adjust_raw(&mut self, index: usize, raw: f64) -> Result<&AllocationSet, SplitError> {
        self.adjust(index, engine::clamp_percentage(raw))
    }

    /// Set the amount to distribute. Negative input is rejected.
    pub fn set_total_amount(&mut self, amount: Decimal) -> Result<(), SplitError> {
        if amount.is_negative() {
            return Err(crate::domain::ValidationError::NonPositiveAmount(amount).into());
        }
        self.total_amount = amount;
        Ok(())
    }

    /// Live per-bucket amounts for the current total.
    pub fn preview_amounts(&self) -> Result<BTreeMap<String, String>, SplitError> {
        Ok(engine::bucket_amounts(self.total_amount, &self.allocation)?)
    }

    /// Start a history request for the connected payer.
    pub fn begin_history_request(&mut self) -> Result<HistoryTicket, SplitError> {
        let address = self.payer.clone().ok_or(SplitError::NotConnected)?;
        self.request_seq += 1;
        Ok(HistoryTicket {
            seq: self.request_seq,
            address,
        })
    }

    pub fn is_current_request(&self, ticket: &HistoryTicket) -> bool {
        ticket.seq == self.request_seq && self.payer.as_ref() == Some(&ticket.address)
    }

    /// Turn a fetch result into a suggestion.
    ///
    /// Returns `Ok(None)` when a newer request has been issued since
    /// `ticket`; the result is discarded. A failed fetch is reported as
    /// `SplitError::Fetch`. The allocation is never modified here.
    pub fn complete_history_request(
        &self,
        ticket: &HistoryTicket,
        fetched: Result<Vec<HistoricalEvent>, DataSourceError>,
    ) -> Result<Option<Suggestion>, SplitError> {
        if !self.is_current_request(ticket) {
            debug!("Discarding stale history result (seq {})", ticket.seq);
            return Ok(None);
        }
        let events = fetched?;
        let suggestion = engine::suggest(&self.profile, &events, self.allocation.len())?;
        Ok(Some(suggestion))
    }

    pub(crate) fn begin_transition(&mut self) -> TransitionToken {
        self.revision += 1;
        self.optimizing = true;
        TransitionToken(self.revision)
    }

    pub(crate) fn is_current_transition(&self, token: TransitionToken) -> bool {
        token.0 == self.revision
    }

    /// Apply one animation frame if `token` is still current.
    pub(crate) fn apply_frame(
        &mut self,
        token: TransitionToken,
        frame: &[Decimal],
    ) -> Result<bool, SplitError> {
        if !self.is_current_transition(token) {
            return Ok(false);
        }
        self.allocation = self.allocation.with_percentages(frame)?;
        Ok(true)
    }

    pub(crate) fn finish_transition(&mut self, token: TransitionToken) {
        if self.is_current_transition(token) {
            self.optimizing = false;
        }
    }

    /// Validate and build the submission for the current state.
    pub fn submission_request(&self, contract: &Contract) -> Result<SubmissionRequest, SplitError> {
        let allocations = engine::assemble(self.total_amount, &self.allocation)?;
        let payer = self.payer.clone().ok_or(SplitError::NotConnected)?;
        Ok(SubmissionRequest {
            payer,
            total_amount: self.total_amount.to_fixed(engine::assemble::AMOUNT_DP),
            allocations,
            script: create_payout_script(contract),
            compute_limit: COMPUTE_LIMIT,
        })
    }
}

/// Fetch history for the connected payer and compute a suggestion.
///
/// The session lock is not held while fetching. `Ok(None)` means a newer
/// request superseded this one.
pub async fn suggest_from_history(
    session: &SharedSession,
    source: &dyn EventSource,
) -> Result<Option<Suggestion>, SplitError> {
    let ticket = session.lock().await.begin_history_request()?;
    let fetched = source.fetch_events(ticket.address()).await;
    let result = session
        .lock()
        .await
        .complete_history_request(&ticket, fetched);
    if let Ok(Some(s)) = &result {
        info!(
            "Suggested split {:?} (tier {:?}, average {:.2} over {} payouts)",
            s.targets, s.tier, s.average, s.sample_size
        );
    }
    result
}

/// Submit the current allocation and wait for the transaction to seal.
pub async fn submit(
    session: &SharedSession,
    submitter: &dyn PayoutSubmitter,
    contract: &Contract,
) -> Result<SubmissionReceipt, SplitError> {
    let request = session.lock().await.submission_request(contract)?;
    let tx_id = submitter.submit(&request).await?;
    info!("Submitted payout {} for {}", tx_id.short(), request.payer);

    match submitter.await_sealed(&tx_id).await? {
        TxStatus::Sealed => Ok(SubmissionReceipt {
            tx_id,
            allocations: request.allocations,
        }),
        TxStatus::Failed(reason) => Err(SubmitError::Failed(reason).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use std::str::FromStr;

    fn payer() -> Address {
        Address::from_str("0x00000000000000aa").unwrap()
    }

    fn session() -> SplitSession {
        SplitSession::new(SplitProfile::guild()).unwrap()
    }

    #[test]
    fn test_new_session_is_empty() {
        let s = session();
        assert_eq!(s.allocation().len(), 3);
        assert!(s.allocation().total().is_zero());
        assert!(!s.is_optimizing());
    }

    #[test]
    fn test_adjust_bumps_revision() {
        let mut s = session();
        let before = s.revision();
        s.adjust(0, Decimal::from(40u32)).unwrap();
        assert_eq!(s.revision(), before + 1);
        s.adjust_raw(1, 70.0).unwrap();
        assert_eq!(s.allocation().percentages()[1], Decimal::from(60u32));
    }

    #[test]
    fn test_history_requires_connection() {
        let mut s = session();
        assert_eq!(s.begin_history_request(), Err(SplitError::NotConnected));
    }

    #[test]
    fn test_stale_history_is_discarded() {
        let mut s = session();
        s.connect(payer());
        let first = s.begin_history_request().unwrap();
        let second = s.begin_history_request().unwrap();
        assert_eq!(s.complete_history_request(&first, Ok(vec![])), Ok(None));
        assert!(s.complete_history_request(&second, Ok(vec![])).unwrap().is_some());
    }

    #[test]
    fn test_disconnect_invalidates_request() {
        let mut s = session();
        s.connect(payer());
        let ticket = s.begin_history_request().unwrap();
        s.disconnect();
        assert!(!s.is_current_request(&ticket));
    }

    #[test]
    fn test_frame_rejected_after_user_edit() {
        let mut s = session();
        let token = s.begin_transition();
        s.adjust(2, Decimal::from(10u32)).unwrap();
        let applied = s
            .apply_frame(token, &[Decimal::hundred(), Decimal::zero(), Decimal::zero()])
            .unwrap();
        assert!(!applied);
        assert_eq!(s.allocation().percentages()[2], Decimal::from(10u32));
        assert!(!s.is_optimizing());
    }

    #[test]
    fn test_submission_request_validates() {
        let mut s = session();
        s.connect(payer());
        let contract = Contract::new("0xDeployer", "SubscriptionManagerV2");
        assert!(matches!(
            s.submission_request(&contract),
            Err(SplitError::Validation(_))
        ));

        s.set_total_amount(Decimal::from(100u32)).unwrap();
        s.adjust(0, Decimal::from(33u32)).unwrap();
        s.adjust(1, Decimal::from(33u32)).unwrap();
        s.adjust(2, Decimal::from(34u32)).unwrap();
        let req = s.submission_request(&contract).unwrap();
        assert_eq!(req.total_amount, "100.00");
        assert_eq!(req.allocations["Member C"], "34.00");
        assert!(req.script.contains("import SubscriptionManagerV2 from 0xdeployer"));
    }

    #[test]
    fn test_preview_amounts_reports_overflow() {
        let mut s = session();
        s.adjust(0, Decimal::from(50u32)).unwrap();
        s.set_total_amount(Decimal::from(10u32)).unwrap();
        assert_eq!(s.preview_amounts().unwrap()["Member A"], "5.00");

        let max = Decimal::new(rust_decimal::Decimal::MAX);
        s.set_total_amount(max).unwrap();
        assert_eq!(
            s.preview_amounts(),
            Err(SplitError::Validation(ValidationError::AmountTooLarge(max)))
        );
    }

    #[test]
    fn test_negative_total_rejected() {
        let mut s = session();
        assert!(s.set_total_amount(-Decimal::hundred()).is_err());
        assert!(s.total_amount().is_zero());
    }
}
