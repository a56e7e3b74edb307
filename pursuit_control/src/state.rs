//! Mutable per-run tick state and its serialization projection.

use std::time::Instant;

use pursuit_common::plant::{Force2D, PlantState};
use pursuit_common::protocol::StateMessage;
use pursuit_common::task::TaskState;

/// Everything the loop mutates across a tick, plus the monotonic clock
/// reference established at the first tick.
#[derive(Debug, Clone)]
pub struct ExperimentState {
    /// Monotonic reference taken at the first tick of a run.
    start: Option<Instant>,
    /// Elapsed time since the first tick [µs].
    pub current_time_us: u64,
    /// Tick counter; strictly monotonic during a run.
    pub loop_count: u64,
    /// Current plant state.
    pub cursor: PlantState,
    /// Current target X position [m].
    pub target_x: f64,
    /// Current target Y position [m].
    pub target_y: f64,
    /// Task lifecycle state as of the last update.
    pub task_state: TaskState,
    /// Trial counter, bumped at each run entry.
    pub trial_number: u32,
    /// Force injected this tick [N].
    pub last_input: Force2D,
    /// Whether the loop is actively ticking.
    pub running: bool,
}

impl Default for ExperimentState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentState {
    /// Create a zeroed state with no clock reference yet.
    pub fn new() -> Self {
        Self {
            start: None,
            current_time_us: 0,
            loop_count: 0,
            cursor: PlantState::ZERO,
            target_x: 0.0,
            target_y: 0.0,
            task_state: TaskState::Idle,
            trial_number: 0,
            last_input: Force2D::ZERO,
            running: false,
        }
    }

    /// Advance the clock. The first call establishes the monotonic
    /// reference; every call refreshes `current_time_us` relative to it.
    #[inline]
    pub fn tick_clock(&mut self) -> u64 {
        let start = *self.start.get_or_insert_with(Instant::now);
        self.current_time_us = start.elapsed().as_micros() as u64;
        self.current_time_us
    }

    /// Clear all counters and zero the state, dropping the clock reference.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Project the tick into its wire frame. The emitted timestamp equals
    /// `current_time_us` of the tick being serialized.
    #[inline]
    pub fn to_message(&self) -> StateMessage {
        StateMessage {
            timestamp_us: self.current_time_us as f64,
            cursor_x: self.cursor.cx,
            cursor_y: self.cursor.cy,
            cursor_vx: self.cursor.vx,
            cursor_vy: self.cursor.vy,
            target_x: self.target_x,
            target_y: self.target_y,
            task_state: self.task_state.as_u32(),
            trial_number: self.trial_number,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_zeroed() {
        let state = ExperimentState::new();
        assert_eq!(state.current_time_us, 0);
        assert_eq!(state.loop_count, 0);
        assert_eq!(state.cursor, PlantState::ZERO);
        assert_eq!(state.task_state, TaskState::Idle);
        assert_eq!(state.trial_number, 0);
        assert!(!state.running);
    }

    #[test]
    fn clock_is_monotonic() {
        let mut state = ExperimentState::new();
        let a = state.tick_clock();
        let b = state.tick_clock();
        let c = state.tick_clock();
        assert!(a <= b && b <= c);
    }

    #[test]
    fn reset_after_reset_equals_single_reset() {
        let mut state = ExperimentState::new();
        state.tick_clock();
        state.loop_count = 42;
        state.trial_number = 3;
        state.cursor.cx = 1.0;
        state.reset();
        let once = state.clone();
        state.reset();
        assert_eq!(state.loop_count, once.loop_count);
        assert_eq!(state.trial_number, once.trial_number);
        assert_eq!(state.cursor, once.cursor);
        assert_eq!(state.current_time_us, once.current_time_us);
    }

    #[test]
    fn message_projection_copies_all_fields() {
        let mut state = ExperimentState::new();
        state.current_time_us = 1500;
        state.cursor = PlantState::new(0.1, -0.2, 0.3, -0.4);
        state.target_x = 0.05;
        state.target_y = -0.05;
        state.task_state = TaskState::Running;
        state.trial_number = 7;

        let msg = state.to_message();
        assert_eq!(msg.timestamp_us, 1500.0);
        assert_eq!(msg.cursor_x, 0.1);
        assert_eq!(msg.cursor_y, -0.2);
        assert_eq!(msg.cursor_vx, 0.3);
        assert_eq!(msg.cursor_vy, -0.4);
        assert_eq!(msg.target_x, 0.05);
        assert_eq!(msg.target_y, -0.05);
        assert_eq!(msg.task_state, 1);
        assert_eq!(msg.trial_number, 7);
    }
}
