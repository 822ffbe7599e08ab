// Repetition counting on top of classified pose states

use crate::models::pose::ExerciseState;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Emitted by `RepCounter::update` when a repetition completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepEvent {
    pub rep_count: u32,
    /// Set on every rep at or past the target
    pub target_met: bool,
}

/// Counts one repetition per `down` -> `up` cycle.
///
/// Only stable states move `previous_stable_state`, so passing through
/// `transitioning` between the two never breaks a cycle. Frames without a
/// visible body are ignored entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepCounter {
    rep_count: u32,
    previous_stable_state: ExerciseState,
    down_achieved_in_cycle: bool,
    target_reps: Option<u32>,
}

impl RepCounter {
    pub fn new() -> Self {
        Self {
            rep_count: 0,
            previous_stable_state: ExerciseState::Up,
            down_achieved_in_cycle: false,
            target_reps: None,
        }
    }

    pub fn with_target(target_reps: Option<u32>) -> Self {
        Self {
            target_reps,
            ..Self::new()
        }
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn target_reps(&self) -> Option<u32> {
        self.target_reps
    }

    pub fn set_target(&mut self, target_reps: Option<u32>) {
        self.target_reps = target_reps;
    }

    pub fn previous_stable_state(&self) -> ExerciseState {
        self.previous_stable_state
    }

    pub fn target_met(&self) -> bool {
        self.target_reps.is_some_and(|target| self.rep_count >= target)
    }

    /// Zero the count and restart the cycle from `start_state`.
    /// Anything other than `down` restarts from `up`.
    pub fn reset(&mut self, start_state: ExerciseState) {
        let start_state = if start_state.is_stable() {
            start_state
        } else {
            ExerciseState::Up
        };
        debug!(
            reps = self.rep_count,
            start_state = start_state.to_string(),
            "rep counter reset"
        );
        self.rep_count = 0;
        self.previous_stable_state = start_state;
        self.down_achieved_in_cycle = false;
    }

    pub fn update(&mut self, state: ExerciseState, is_visible: bool) -> Option<RepEvent> {
        if !is_visible {
            return None;
        }

        let mut event = None;

        if state == ExerciseState::Up
            && self.previous_stable_state == ExerciseState::Down
            && self.down_achieved_in_cycle
        {
            self.rep_count += 1;
            self.down_achieved_in_cycle = false;

            let target_met = self.target_met();
            info!(reps = self.rep_count, target = ?self.target_reps, "rep completed");
            event = Some(RepEvent {
                rep_count: self.rep_count,
                target_met,
            });
        }

        if state == ExerciseState::Down {
            self.down_achieved_in_cycle = true;
        }

        if state.is_stable() {
            self.previous_stable_state = state;
        }

        event
    }
}

impl Default for RepCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExerciseState::{Down, Transitioning, Up};

    fn feed(counter: &mut RepCounter, states: &[ExerciseState]) -> Vec<RepEvent> {
        states
            .iter()
            .filter_map(|state| counter.update(*state, true))
            .collect()
    }

    #[test]
    fn test_full_cycle_counts_one_rep() {
        let mut counter = RepCounter::new();
        let events = feed(&mut counter, &[Up, Transitioning, Down, Transitioning, Up]);
        assert_eq!(counter.rep_count(), 1);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].rep_count, 1);
        assert!(!events[0].target_met);
    }

    #[test]
    fn test_partial_descent_does_not_count() {
        let mut counter = RepCounter::new();
        feed(&mut counter, &[Up, Transitioning, Up, Transitioning, Up]);
        assert_eq!(counter.rep_count(), 0);
    }

    #[test]
    fn test_repeated_up_counts_once() {
        let mut counter = RepCounter::new();
        feed(&mut counter, &[Down, Up, Up, Up, Transitioning, Up]);
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_direct_down_to_up_counts() {
        let mut counter = RepCounter::new();
        feed(&mut counter, &[Up, Up, Down, Down, Up]);
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_invisible_frames_are_ignored() {
        let mut counter = RepCounter::new();
        counter.update(Down, true);
        assert_eq!(counter.update(Up, false), None);
        assert_eq!(counter.rep_count(), 0);
        assert_eq!(counter.previous_stable_state(), Down);

        let event = counter.update(Up, true);
        assert_eq!(event.map(|e| e.rep_count), Some(1));
    }

    #[test]
    fn test_target_met_on_every_rep_past_target() {
        let mut counter = RepCounter::with_target(Some(2));
        let cycle = [Down, Up];

        let first = feed(&mut counter, &cycle);
        assert!(!first[0].target_met);
        let second = feed(&mut counter, &cycle);
        assert!(second[0].target_met);
        assert!(counter.target_met());

        let third = feed(&mut counter, &cycle);
        assert_eq!(third[0].rep_count, 3);
        assert!(third[0].target_met);
    }

    #[test]
    fn test_no_target_never_met() {
        let mut counter = RepCounter::new();
        let events = feed(&mut counter, &[Down, Up, Down, Up]);
        assert!(events.iter().all(|e| !e.target_met));
    }

    #[test]
    fn test_reset_to_unstable_state_starts_from_up() {
        let mut counter = RepCounter::new();
        counter.reset(Transitioning);
        assert_eq!(counter.previous_stable_state(), Up);
        counter.reset(ExerciseState::None);
        assert_eq!(counter.previous_stable_state(), Up);

        counter.reset(Down);
        assert_eq!(counter.previous_stable_state(), Down);
    }

    #[test]
    fn test_reset_restarts_cycle() {
        let mut counter = RepCounter::new();
        feed(&mut counter, &[Down, Up, Down]);
        assert_eq!(counter.rep_count(), 1);

        counter.reset(Up);
        assert_eq!(counter.rep_count(), 0);
        assert_eq!(counter.previous_stable_state(), Up);

        // Pending down from before the reset is discarded
        assert_eq!(counter.update(Up, true), None);
        feed(&mut counter, &[Down, Up]);
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_counter_never_decreases() {
        let mut counter = RepCounter::new();
        let pattern = [Up, Down, Transitioning, Up, Up, Transitioning, Down, Down, Up, Transitioning];
        let mut last = 0;
        for state in pattern.iter().cycle().take(100) {
            counter.update(*state, true);
            assert!(counter.rep_count() >= last);
            last = counter.rep_count();
        }
    }
}
