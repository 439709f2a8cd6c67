//! Timer-driven playback of a `Transition` onto a shared session.

use super::SharedSession;
use crate::domain::Decimal;
use crate::engine::{Transition, TransitionCadence};
use crate::error::SplitError;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Every frame was applied; the allocation now equals the targets.
    Completed,
    /// A user edit or a newer transition took over; remaining frames were
    /// dropped.
    Superseded,
}

/// Animate the session's allocation toward `targets`, one frame per tick.
///
/// Any user edit made while this runs wins: the transition notices at its
/// next tick and stops without touching the allocation again.
pub async fn run_transition(
    session: &SharedSession,
    targets: &[Decimal],
    cadence: TransitionCadence,
) -> Result<TransitionOutcome, SplitError> {
    let (frames, token) = {
        let mut guard = session.lock().await;
        let frames = Transition::new(&guard.allocation().percentages(), targets, cadence.steps)?;
        (frames, guard.begin_transition())
    };

    let mut ticker = interval(cadence.step_duration);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    for frame in frames {
        ticker.tick().await;
        let applied = session.lock().await.apply_frame(token, &frame)?;
        if !applied {
            debug!("Transition superseded; dropping remaining frames");
            return Ok(TransitionOutcome::Superseded);
        }
    }

    session.lock().await.finish_transition(token);
    Ok(TransitionOutcome::Completed)
}

/// `run_transition` with whole-number targets as produced by the suggestion
/// heuristic.
pub async fn animate_to_suggestion(
    session: &SharedSession,
    targets: &[u32],
    cadence: TransitionCadence,
) -> Result<TransitionOutcome, SplitError> {
    let targets: Vec<Decimal> = targets.iter().map(|t| Decimal::from(*t)).collect();
    run_transition(session, &targets, cadence).await
}
