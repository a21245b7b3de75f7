//! Step controller shared by the registration and login wizards.

use std::fmt;

/// Proof that the backend confirmed a step.
///
/// Only this crate can mint one, and only from a backend response that
/// carried the expected `next_step`; [`StepController::advance`] accepts
/// nothing else.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub struct Ack {
    step: u8,
}

impl Ack {
    pub(crate) fn confirming(step: u8) -> Self {
        Self { step }
    }

    pub fn step(&self) -> u8 {
        self.step
    }
}

/// Progress marker for one step panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMarker {
    Completed,
    Active,
    Pending,
}

impl fmt::Display for StepMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StepMarker::Completed => "completed",
            StepMarker::Active => "active",
            StepMarker::Pending => "pending",
        })
    }
}

/// Current step (1-based) of a linear wizard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepController {
    current: u8,
    total: u8,
}

impl StepController {
    pub fn new(total: u8) -> Self {
        Self {
            current: 1,
            total: total.max(1),
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_last(&self) -> bool {
        self.current == self.total
    }

    /// Move to the step after the one `ack` confirms.
    ///
    /// An ack for any step other than the current one is ignored and the
    /// step is left unchanged.
    pub fn advance(&mut self, ack: Ack) -> u8 {
        if ack.step != self.current {
            tracing::warn!(
                acked = ack.step,
                current = self.current,
                "ignoring acknowledgement for inactive step"
            );
            return self.current;
        }
        if self.current < self.total {
            self.current += 1;
        }
        self.current
    }

    /// Explicit user "back". Never below step 1; no backend state is undone.
    pub fn back(&mut self) -> u8 {
        if self.current > 1 {
            self.current -= 1;
        }
        self.current
    }

    /// Return to step 1, e.g. when the session expired.
    pub fn reset(&mut self) {
        self.current = 1;
    }

    pub fn markers(&self) -> Vec<StepMarker> {
        (1..=self.total)
            .map(|step| match step.cmp(&self.current) {
                std::cmp::Ordering::Less => StepMarker::Completed,
                std::cmp::Ordering::Equal => StepMarker::Active,
                std::cmp::Ordering::Greater => StepMarker::Pending,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_only_on_ack_for_current_step() {
        let mut steps = StepController::new(3);
        assert_eq!(steps.advance(Ack::confirming(2)), 1);
        assert_eq!(steps.advance(Ack::confirming(1)), 2);
        assert_eq!(steps.advance(Ack::confirming(2)), 3);
        // Last step stays put.
        assert_eq!(steps.advance(Ack::confirming(3)), 3);
    }

    #[test]
    fn back_stops_at_first_step() {
        let mut steps = StepController::new(4);
        let _ = steps.advance(Ack::confirming(1));
        assert_eq!(steps.back(), 1);
        assert_eq!(steps.back(), 1);
    }

    #[test]
    fn markers_follow_current_step() {
        let mut steps = StepController::new(3);
        let _ = steps.advance(Ack::confirming(1));
        assert_eq!(
            steps.markers(),
            vec![StepMarker::Completed, StepMarker::Active, StepMarker::Pending]
        );
    }
}
