//! Periodic compounding of a displayed balance.
//!
//! The task owns nothing but a clone of the balance handle; stopping it or
//! dropping its owner cancels it.

use crate::domain::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

pub type SharedBalance = Arc<Mutex<Decimal>>;

#[derive(Debug)]
pub struct CompoundingTask {
    handle: Option<JoinHandle<()>>,
}

impl CompoundingTask {
    /// Every `period`, `balance = round2(balance * (1 + rate))`. The first
    /// update lands one full period after start.
    pub fn start(balance: SharedBalance, rate: Decimal, period: Duration) -> Self {
        let factor = Decimal::from(1u32) + rate;
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let mut guard = balance.lock().await;
                *guard = (*guard * factor).round_half_up(2);
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Compounding stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for CompoundingTask {
    fn drop(&mut self) {
        self.stop();
    }
}

/// On/off switch owning at most one running `CompoundingTask`.
#[derive(Debug)]
pub struct CompoundingToggle {
    balance: SharedBalance,
    rate: Decimal,
    period: Duration,
    task: Option<CompoundingTask>,
}

impl CompoundingToggle {
    pub fn new(initial: Decimal, rate: Decimal, period: Duration) -> Self {
        Self {
            balance: Arc::new(Mutex::new(initial)),
            rate,
            period,
            task: None,
        }
    }

    pub fn set(&mut self, enabled: bool) {
        match (enabled, self.task.is_some()) {
            (true, false) => {
                self.task = Some(CompoundingTask::start(
                    self.balance.clone(),
                    self.rate,
                    self.period,
                ));
            }
            (false, true) => self.task = None,
            _ => {}
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.task.is_some()
    }

    pub async fn balance(&self) -> Decimal {
        *self.balance.lock().await
    }

    pub fn balance_handle(&self) -> SharedBalance {
        self.balance.clone()
    }
}
