//! Fitts' law target acquisition on an ISO 9241-9 ring.
//!
//! Targets sit on a circle; the visiting order steps through the 1-based
//! indices with skip = ⌊N/2⌋ + 1, which alternates across the ring and
//! keeps every movement amplitude equal. A movement completes by dwelling
//! inside the current target disc.

use heapless::Vec;
use serde::Serialize;

use pursuit_common::plant::PlantState;
use pursuit_common::task::TaskState;

/// Upper bound on recordable movements per trial.
pub const MAX_MOVEMENTS: usize = 64;

/// Fitts task parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittsConfig {
    /// Number of targets on the ring.
    pub num_targets: usize,
    /// Ring radius R [m].
    pub ring_radius: f64,
    /// Target width W [m]; the target disc has radius W/2.
    pub target_width: f64,
    /// Dwell time required to acquire [s].
    pub dwell: f64,
    /// Movements per trial (clamped to [`MAX_MOVEMENTS`]).
    pub movements: usize,
}

impl Default for FittsConfig {
    fn default() -> Self {
        Self {
            num_targets: 13,
            ring_radius: 0.08,
            target_width: 0.008,
            dwell: 0.1,
            movements: 26,
        }
    }
}

/// Throughput report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittsMetrics {
    /// Movement amplitude 2R·sin(π·skip/N) [m].
    pub amplitude: f64,
    /// Shannon index of difficulty log2(A/W + 1) [bits].
    pub index_of_difficulty: f64,
    /// Mean movement time [s]; 0 with no completed movements.
    pub mean_movement_time: f64,
    /// ID / mean movement time [bits/s]; 0 with no completed movements.
    pub throughput: f64,
    /// Fraction of error-flagged movements. The per-movement flags are
    /// recorded but no miss detector sets them yet, so this reports 0.
    pub error_rate: f64,
    /// Movements completed so far.
    pub movements_completed: usize,
    /// Movements in the trial.
    pub movements_total: usize,
}

/// Fitts' law task.
#[derive(Debug)]
pub struct FittsTask {
    config: FittsConfig,
    skip: usize,
    state: TaskState,
    elapsed: f64,
    /// Current target index, 1-based in [1, N].
    current_index: usize,
    inside: bool,
    dwell: f64,
    movement_start: f64,
    movement_times: Vec<f64, MAX_MOVEMENTS>,
    movement_errors: Vec<bool, MAX_MOVEMENTS>,
}

impl FittsTask {
    /// Construct; `movements` is clamped to [`MAX_MOVEMENTS`].
    pub fn new(mut config: FittsConfig) -> Self {
        if config.movements > MAX_MOVEMENTS {
            tracing::warn!(
                "fitts movements {} clamped to {MAX_MOVEMENTS}",
                config.movements
            );
            config.movements = MAX_MOVEMENTS;
        }
        let skip = config.num_targets / 2 + 1;
        Self {
            config,
            skip,
            state: TaskState::Idle,
            elapsed: 0.0,
            current_index: 1,
            inside: false,
            dwell: 0.0,
            movement_start: 0.0,
            movement_times: Vec::new(),
            movement_errors: Vec::new(),
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Current target index, 1-based.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Centre of target `index` (1-based) on the ring: angle
    /// 2π·(index−1)/N − π/2 at radius R.
    pub fn target_center(&self, index: usize) -> (f64, f64) {
        let n = self.config.num_targets as f64;
        let k = (index - 1) as f64;
        let angle = std::f64::consts::TAU * k / n - std::f64::consts::FRAC_PI_2;
        (
            self.config.ring_radius * angle.cos(),
            self.config.ring_radius * angle.sin(),
        )
    }

    /// The current target centre; position-stable until acquisition, so τ
    /// is not consulted.
    #[inline]
    pub fn target(&self, _tau: f64) -> (f64, f64) {
        self.target_center(self.current_index)
    }

    /// Advance one tick of dwell-based acquisition.
    pub fn update(&mut self, cursor: &PlantState, dt: f64) -> TaskState {
        match self.state {
            TaskState::Idle => {
                self.state = TaskState::Running;
                self.movement_start = 0.0;
            }
            TaskState::Running => {}
            _ => return self.state,
        }

        self.elapsed += dt;

        let (tx, ty) = self.target_center(self.current_index);
        let dist = (cursor.cx - tx).hypot(cursor.cy - ty);
        let inside_now = dist <= self.config.target_width / 2.0;

        if inside_now {
            if !self.inside {
                self.inside = true;
                self.dwell = 0.0;
            }
            self.dwell += dt;
            if self.dwell >= self.config.dwell {
                self.complete_movement();
            }
        } else {
            self.inside = false;
            self.dwell = 0.0;
        }

        self.state
    }

    fn complete_movement(&mut self) {
        let _ = self.movement_times.push(self.elapsed - self.movement_start);
        let _ = self.movement_errors.push(false);
        self.dwell = 0.0;
        self.inside = false;
        if self.movement_times.len() >= self.config.movements {
            self.state = TaskState::Completed;
        } else {
            self.current_index =
                (self.current_index - 1 + self.skip) % self.config.num_targets + 1;
            self.movement_start = self.elapsed;
        }
    }

    /// Back to Idle with the sequence rewound and records cleared.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Promote Running to Completed at run teardown.
    pub fn finish(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Completed;
        }
    }

    /// Current throughput report.
    pub fn metrics(&self) -> FittsMetrics {
        let n = self.config.num_targets as f64;
        let amplitude =
            2.0 * self.config.ring_radius * (std::f64::consts::PI * self.skip as f64 / n).sin();
        let index_of_difficulty = (amplitude / self.config.target_width + 1.0).log2();

        let completed = self.movement_times.len();
        let mean_movement_time = if completed > 0 {
            self.movement_times.iter().sum::<f64>() / completed as f64
        } else {
            0.0
        };
        let throughput = if mean_movement_time > 0.0 {
            index_of_difficulty / mean_movement_time
        } else {
            0.0
        };
        let error_rate = if completed > 0 {
            self.movement_errors.iter().filter(|e| **e).count() as f64 / completed as f64
        } else {
            0.0
        };

        FittsMetrics {
            amplitude,
            index_of_difficulty,
            mean_movement_time,
            throughput,
            error_rate,
            movements_completed: completed,
            movements_total: self.config.movements,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
