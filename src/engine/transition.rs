//! Frame generation for the animated move from the current allocation to a
//! suggested one. Timing lives in `session::animate`; this is pure.

use crate::domain::{Decimal, ValidationError};
use crate::engine::residual::{fix_residual, index_of_max};
use std::time::Duration;

pub const DEFAULT_STEPS: u32 = 20;
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Number of frames and the delay between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionCadence {
    pub steps: u32,
    pub step_duration: Duration,
}

impl Default for TransitionCadence {
    fn default() -> Self {
        Self::over(DEFAULT_STEPS, DEFAULT_DURATION)
    }
}

impl TransitionCadence {
    /// `steps` frames spread evenly over `total`.
    pub fn over(steps: u32, total: Duration) -> Self {
        let steps = steps.max(1);
        Self {
            steps,
            step_duration: total / steps,
        }
    }
}

/// Iterator over intermediate percentage vectors.
///
/// Frame `i` of `n` sits at `start + (target - start) * i / n`, rounded to
/// hundredths. The last frame is the residual-corrected target itself.
#[derive(Debug, Clone)]
pub struct Transition {
    start: Vec<Decimal>,
    targets: Vec<Decimal>,
    steps: u32,
    step: u32,
}

impl Transition {
    pub fn new(
        start: &[Decimal],
        targets: &[Decimal],
        steps: u32,
    ) -> Result<Self, ValidationError> {
        if start.len() != targets.len() {
            return Err(ValidationError::LengthMismatch {
                expected: start.len(),
                got: targets.len(),
            });
        }
        if targets.is_empty() {
            return Err(ValidationError::EmptyAllocation);
        }
        Ok(Self {
            start: start.to_vec(),
            targets: fix_residual(targets),
            steps: steps.max(1),
            step: 0,
        })
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// The values the transition settles on.
    pub fn final_frame(&self) -> &[Decimal] {
        &self.targets
    }

    fn frame_at(&self, step: u32) -> Vec<Decimal> {
        if step >= self.steps {
            return self.targets.clone();
        }
        let progress = Decimal::from(step) / Decimal::from(self.steps);
        let mut frame: Vec<Decimal> = self
            .start
            .iter()
            .zip(&self.targets)
            .map(|(s, t)| (*s + (*t - *s) * progress).round_half_up(2))
            .collect();

        // Per-bucket rounding can overshoot 100 by a few hundredths.
        let excess = frame.iter().sum::<Decimal>() - Decimal::hundred();
        if excess.is_positive() {
            if let Some(idx) = index_of_max(&frame) {
                frame[idx] = (frame[idx] - excess).clamp_percentage();
            }
        }
        frame
    }
}

impl Iterator for Transition {
    type Item = Vec<Decimal>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;
        Some(self.frame_at(self.step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.steps - self.step) as usize;
        (left, Some(left))
    }
}
