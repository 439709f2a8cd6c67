//! Mock event source for testing without network calls.

use super::{DataSourceError, EventSource};
use crate::domain::{Address, HistoricalEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Returns predefined events, or a predefined failure.
#[derive(Debug, Clone, Default)]
pub struct MockEventSource {
    events: Vec<HistoricalEvent>,
    failure: Option<DataSourceError>,
    calls: Arc<AtomicUsize>,
}

impl MockEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: HistoricalEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_events(mut self, events: Vec<HistoricalEvent>) -> Self {
        self.events.extend(events);
        self
    }

    /// Every fetch fails with `error`.
    pub fn failing(mut self, error: DataSourceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Number of fetches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn fetch_events(
        &self,
        address: &Address,
    ) -> Result<Vec<HistoricalEvent>, DataSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        Ok(self
            .events
            .iter()
            .filter(|e| {
                e.payer.as_deref() == Some(address.as_str())
                    || e.payee.as_deref() == Some(address.as_str())
                    || (e.payer.is_none() && e.payee.is_none())
            })
            .cloned()
            .collect())
    }
}
