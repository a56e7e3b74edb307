//! Critical-instability tracking with a first-order unstable shadow plant.
//!
//! The task owns its own plant `ċ = λ·c + K_u·u` per axis, integrated with
//! forward Euler. The default second-order plant would add damping the
//! paradigm must not have, so the loop bypasses it while this task runs:
//! the operator acts on the shadow state and the shadow positions are
//! projected as the cursor with zero velocities. λ ramps on both axes
//! together until the operator loses control (divergence → Failed) or the
//! ramp tops out (λ_max → Completed). Divergence is an experiment outcome,
//! not an error.

use serde::Serialize;

use pursuit_common::plant::{Force2D, PlantState};
use pursuit_common::task::TaskState;

use crate::operator::OperatorDevice;

/// Critical-instability task parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CitConfig {
    /// Initial instability λ [rad/s].
    pub lambda_start: f64,
    /// Ramp increment Δλ [rad/s].
    pub lambda_step: f64,
    /// Time between increments [s].
    pub step_interval: f64,
    /// Input gain K_u.
    pub input_gain: f64,
    /// Divergence threshold on ‖(cx, cy)‖ [m].
    pub divergence_threshold: f64,
    /// Ramp ceiling [rad/s]; reaching it completes the trial.
    pub lambda_max: f64,
}

impl Default for CitConfig {
    fn default() -> Self {
        Self {
            lambda_start: 0.5,
            lambda_step: 0.2,
            step_interval: 30.0,
            input_gain: 1.0,
            divergence_threshold: 0.08,
            lambda_max: 10.0,
        }
    }
}

/// Critical-stability report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CitMetrics {
    /// λ at the terminal tick [rad/s].
    pub lambda_critical: f64,
    /// Elapsed time at the terminal tick [s].
    pub divergence_time: f64,
    /// Ramp increments applied.
    pub increments: u32,
    /// ‖(cx, cy)‖ of the shadow plant now [m].
    pub final_distance: f64,
    /// Whether the trial ended in divergence (Failed) rather than at λ_max.
    pub diverged: bool,
}

/// Critical-instability task.
#[derive(Debug)]
pub struct CitTask {
    config: CitConfig,
    state: TaskState,
    shadow_x: f64,
    shadow_y: f64,
    lambda_x: f64,
    lambda_y: f64,
    elapsed: f64,
    since_increment: f64,
    increments: u32,
    divergence_time: f64,
    lambda_critical: f64,
}

impl CitTask {
    /// Construct at λ_start with the shadow plant at the origin.
    pub fn new(config: CitConfig) -> Self {
        Self {
            config,
            state: TaskState::Idle,
            shadow_x: 0.0,
            shadow_y: 0.0,
            lambda_x: config.lambda_start,
            lambda_y: config.lambda_start,
            elapsed: 0.0,
            since_increment: 0.0,
            increments: 0,
            divergence_time: 0.0,
            lambda_critical: 0.0,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Current instability, equal on both axes [rad/s].
    #[inline]
    pub fn lambda(&self) -> (f64, f64) {
        (self.lambda_x, self.lambda_y)
    }

    /// Shadow positions projected as a cursor with zero velocities.
    #[inline]
    pub fn shadow_state(&self) -> PlantState {
        PlantState::new(self.shadow_x, self.shadow_y, 0.0, 0.0)
    }

    /// The target is always the origin.
    #[inline]
    pub fn target(&self, _tau: f64) -> (f64, f64) {
        (0.0, 0.0)
    }

    /// Evaluate the operator against the shadow state and advance the
    /// shadow plant one forward-Euler tick with that force. Returns the
    /// cursor projection and the injected force. No motion before Running
    /// or after a terminal state: a diverged plant is never advanced again.
    pub fn drive(&mut self, operator: &mut OperatorDevice, dt: f64) -> (PlantState, Force2D) {
        if self.state != TaskState::Running {
            return (self.shadow_state(), Force2D::ZERO);
        }
        let u = operator.compute_input(&self.shadow_state());
        self.shadow_x += (self.lambda_x * self.shadow_x + self.config.input_gain * u.ux) * dt;
        self.shadow_y += (self.lambda_y * self.shadow_y + self.config.input_gain * u.uy) * dt;
        (self.shadow_state(), u)
    }

    /// Advance one tick of bookkeeping: ramp the instability and check for
    /// divergence of the shadow plant advanced earlier in the same tick.
    /// The passed cursor is the loop's projection of that shadow state, so
    /// it is not consulted.
    pub fn update(&mut self, _cursor: &PlantState, dt: f64) -> TaskState {
        match self.state {
            TaskState::Idle => {
                self.state = TaskState::Running;
                return self.state;
            }
            TaskState::Running => {}
            _ => return self.state,
        }

        self.elapsed += dt;
        self.since_increment += dt;

        if self.since_increment >= self.config.step_interval {
            self.since_increment = 0.0;
            self.lambda_x += self.config.lambda_step;
            self.lambda_y += self.config.lambda_step;
            self.increments += 1;
            // The increment that first reaches the ceiling completes.
            if self.lambda_x >= self.config.lambda_max {
                self.state = TaskState::Completed;
                self.divergence_time = self.elapsed;
                self.lambda_critical = self.lambda_x;
                return self.state;
            }
        }

        if self.distance() > self.config.divergence_threshold {
            self.state = TaskState::Failed;
            self.divergence_time = self.elapsed;
            self.lambda_critical = self.lambda_x;
        }
        self.state
    }

    /// Back to Idle: shadow at the origin, λ at λ_start.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Promote Running to Completed at run teardown.
    pub fn finish(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Completed;
            self.divergence_time = self.elapsed;
            self.lambda_critical = self.lambda_x;
        }
    }

    /// Current report.
    pub fn metrics(&self) -> CitMetrics {
        CitMetrics {
            lambda_critical: self.lambda_critical,
            divergence_time: self.divergence_time,
            increments: self.increments,
            final_distance: self.distance(),
            diverged: self.state == TaskState::Failed,
        }
    }

    #[inline]
    fn distance(&self) -> f64 {
        self.shadow_x.hypot(self.shadow_y)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
