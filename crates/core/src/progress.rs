//! Step navigation for the assessment wizard.
//!
//! `ProgressState` is a value: every transition borrows the current state and
//! hands back a new one, so a rejected transition leaves the caller's copy as
//! it was.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{Catalog, Responses};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("an assessment needs at least one step")]
    NoSteps,

    #[error("step {step} does not exist (step count {step_count})")]
    UnknownStep { step: usize, step_count: usize },

    #[error("step {step} still has unanswered questions")]
    IncompleteStep { step: usize },

    #[error("step {target} is locked until the current step is complete")]
    StepLocked { target: usize },

    #[error("assessment is already finalized")]
    Finalized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Moved { to: usize },
    Finalized,
}

/// Result of a successful [`ProgressState::advanced`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub state: ProgressState,
    pub outcome: AdvanceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    current: usize,
    completed: BTreeSet<usize>,
    step_count: usize,
    finalized: bool,
}

impl ProgressState {
    /// Positions a new assessment on its first step.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoSteps` when `step_count` is zero.
    pub fn start(step_count: usize) -> Result<Self, ProgressError> {
        if step_count == 0 {
            return Err(ProgressError::NoSteps);
        }
        Ok(Self {
            current: 0,
            completed: BTreeSet::new(),
            step_count,
            finalized: false,
        })
    }

    /// Rebuilds the state of an in-progress assessment.
    ///
    /// # Errors
    ///
    /// Returns `NoSteps` for an empty wizard and `UnknownStep` if `current` or
    /// any completed index is out of range.
    pub fn resume(
        step_count: usize,
        current: usize,
        completed: impl IntoIterator<Item = usize>,
    ) -> Result<Self, ProgressError> {
        let mut state = Self::start(step_count)?;
        state.check_index(current)?;
        for step in completed {
            state.check_index(step)?;
            state.completed.insert(step);
        }
        state.current = current;
        Ok(state)
    }

    /// A terminal state with every step complete, used for finished assessments.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::NoSteps` when `step_count` is zero.
    pub fn finished(step_count: usize) -> Result<Self, ProgressError> {
        let mut state = Self::start(step_count)?;
        state.completed = (0..step_count).collect();
        state.current = step_count - 1;
        state.finalized = true;
        Ok(state)
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[must_use]
    pub fn is_complete(&self, step: usize) -> bool {
        self.completed.contains(&step)
    }

    pub fn completed_steps(&self) -> impl Iterator<Item = usize> + '_ {
        self.completed.iter().copied()
    }

    /// `None` for indices past the last step.
    #[must_use]
    pub fn status(&self, step: usize) -> Option<StepStatus> {
        if step >= self.step_count {
            return None;
        }
        Some(if self.completed.contains(&step) {
            StepStatus::Complete
        } else if step == self.current {
            StepStatus::InProgress
        } else {
            StepStatus::NotStarted
        })
    }

    #[must_use]
    pub fn statuses(&self) -> Vec<StepStatus> {
        (0..self.step_count)
            .filter_map(|step| self.status(step))
            .collect()
    }

    /// Completes the current step and moves on.
    ///
    /// The next step is the lowest-indexed incomplete one; once every step is
    /// complete the state becomes finalized.
    ///
    /// # Errors
    ///
    /// `Finalized` if the state is terminal, `IncompleteStep` if
    /// `current_complete` is false.
    pub fn advanced(&self, current_complete: bool) -> Result<Advance, ProgressError> {
        if self.finalized {
            return Err(ProgressError::Finalized);
        }
        if !current_complete {
            return Err(ProgressError::IncompleteStep { step: self.current });
        }

        let mut next = self.clone();
        next.completed.insert(self.current);

        let outcome = match next.first_incomplete() {
            Some(to) => {
                next.current = to;
                AdvanceOutcome::Moved { to }
            }
            None => {
                next.finalized = true;
                AdvanceOutcome::Finalized
            }
        };

        Ok(Advance {
            state: next,
            outcome,
        })
    }

    /// Switches to `target`.
    ///
    /// Completed steps are always reachable. Any other step is reachable only
    /// when the current step is complete, in which case it is marked so.
    ///
    /// # Errors
    ///
    /// `Finalized`, `UnknownStep` or `StepLocked`.
    pub fn jumped(&self, target: usize, current_complete: bool) -> Result<Self, ProgressError> {
        if self.finalized {
            return Err(ProgressError::Finalized);
        }
        self.check_index(target)?;
        if target == self.current {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        if current_complete {
            next.completed.insert(self.current);
        } else if !self.completed.contains(&target) {
            return Err(ProgressError::StepLocked { target });
        }
        next.current = target;
        Ok(next)
    }

    #[must_use]
    pub fn first_incomplete(&self) -> Option<usize> {
        (0..self.step_count).find(|step| !self.completed.contains(step))
    }

    fn check_index(&self, step: usize) -> Result<(), ProgressError> {
        if step < self.step_count {
            Ok(())
        } else {
            Err(ProgressError::UnknownStep {
                step,
                step_count: self.step_count,
            })
        }
    }
}

/// True when every question of the area at `step` has a response.
#[must_use]
pub fn is_step_complete(catalog: &Catalog, responses: &Responses, step: usize) -> bool {
    catalog
        .area_at(step)
        .is_some_and(|area| area.questions().all(|q| responses.is_answered(q.id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_rejects_empty_wizard() {
        assert_eq!(ProgressState::start(0).unwrap_err(), ProgressError::NoSteps);
        let state = ProgressState::start(3).unwrap();
        assert_eq!(
            state.statuses(),
            vec![
                StepStatus::InProgress,
                StepStatus::NotStarted,
                StepStatus::NotStarted
            ]
        );
    }

    #[test]
    fn advance_requires_complete_step_and_leaves_input_untouched() {
        let state = ProgressState::start(2).unwrap();
        assert_eq!(
            state.advanced(false).unwrap_err(),
            ProgressError::IncompleteStep { step: 0 }
        );

        let Advance { state: next, outcome } = state.advanced(true).unwrap();
        assert_eq!(outcome, AdvanceOutcome::Moved { to: 1 });
        assert_eq!(next.status(0), Some(StepStatus::Complete));
        assert_eq!(state.current(), 0);
        assert!(!state.is_complete(0));
    }

    #[test]
    fn advancing_through_every_step_finalizes_once() {
        let mut state = ProgressState::start(3).unwrap();
        let mut finalized = 0;
        for _ in 0..3 {
            let step = state.advanced(true).unwrap();
            if step.outcome == AdvanceOutcome::Finalized {
                finalized += 1;
            }
            state = step.state;
        }
        assert_eq!(finalized, 1);
        assert!(state.is_finalized());
        assert_eq!(state.advanced(true).unwrap_err(), ProgressError::Finalized);
    }

    #[test]
    fn advance_fills_gaps_left_by_jumps() {
        // step 1 was skipped by a jump from a complete step 0
        let state = ProgressState::resume(3, 2, [0]).unwrap();
        let step = state.advanced(true).unwrap();
        assert_eq!(step.outcome, AdvanceOutcome::Moved { to: 1 });
    }

    #[test]
    fn jump_back_to_completed_step_is_always_allowed() {
        let state = ProgressState::resume(4, 2, [0, 1]).unwrap();
        let back = state.jumped(0, false).unwrap();
        assert_eq!(back.current(), 0);
        assert!(!back.is_complete(2));
        assert_eq!(back.status(2), Some(StepStatus::NotStarted));
    }

    #[test]
    fn jump_forward_needs_current_step_complete() {
        let state = ProgressState::start(4).unwrap();
        assert_eq!(
            state.jumped(3, false).unwrap_err(),
            ProgressError::StepLocked { target: 3 }
        );

        let next = state.jumped(3, true).unwrap();
        assert_eq!(next.current(), 3);
        assert!(next.is_complete(0));
    }

    #[test]
    fn jump_to_current_or_unknown_step() {
        let state = ProgressState::start(2).unwrap();
        assert_eq!(state.jumped(0, false).unwrap(), state);
        assert_eq!(
            state.jumped(5, true).unwrap_err(),
            ProgressError::UnknownStep {
                step: 5,
                step_count: 2
            }
        );
    }

    #[test]
    fn resume_validates_indices() {
        assert!(matches!(
            ProgressState::resume(2, 2, []),
            Err(ProgressError::UnknownStep { .. })
        ));
        assert!(matches!(
            ProgressState::resume(2, 0, [7]),
            Err(ProgressError::UnknownStep { .. })
        ));
    }

    #[test]
    fn finished_state_is_terminal() {
        let state = ProgressState::finished(3).unwrap();
        assert!(state.is_finalized());
        assert_eq!(state.first_incomplete(), None);
        assert_eq!(state.jumped(0, true).unwrap_err(), ProgressError::Finalized);
    }
}
