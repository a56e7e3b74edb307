//! Sum-of-sines reference generator with RMSE accumulation.
//!
//! Two disjoint prime-multiple frequency sets keep the axes decorrelated
//! for frequency-response identification; 1/f amplitude weighting puts the
//! energy into the low end. Error accumulators are scalars, so the steady
//! path allocates nothing.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use pursuit_common::plant::PlantState;
use pursuit_common::task::TaskState;

/// X-axis reference frequencies [Hz].
pub const SOS_FREQS_X: [f64; 6] = [0.10, 0.23, 0.37, 0.61, 1.03, 1.61];
/// Y-axis reference frequencies [Hz].
pub const SOS_FREQS_Y: [f64; 6] = [0.13, 0.29, 0.43, 0.71, 1.13, 1.73];

/// Sum-of-sines task parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SosConfig {
    /// Base amplitude A [m]; each sinusoid contributes A/f.
    pub base_amplitude: f64,
    /// Trial duration [s].
    pub duration: f64,
}

impl Default for SosConfig {
    fn default() -> Self {
        Self {
            base_amplitude: 0.05,
            duration: 60.0,
        }
    }
}

/// Tracking-error report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SosMetrics {
    /// Root-mean-square X error [m].
    pub rmse_x: f64,
    /// Root-mean-square Y error [m].
    pub rmse_y: f64,
    /// Combined RMSE sqrt((Σeₓ² + Σe_y²)/N) [m].
    pub rmse_total: f64,
    /// Accumulated sample count.
    pub samples: u64,
}

/// Sum-of-sines tracking task.
#[derive(Debug)]
pub struct SosTask {
    config: SosConfig,
    phases_x: [f64; 6],
    phases_y: [f64; 6],
    state: TaskState,
    elapsed: f64,
    sum_sq_x: f64,
    sum_sq_y: f64,
    samples: u64,
}

impl SosTask {
    /// Construct with phases drawn from OS entropy.
    pub fn new(config: SosConfig) -> Self {
        Self::with_rng(config, &mut SmallRng::from_os_rng())
    }

    /// Construct with a fixed phase seed for reproducible references.
    pub fn with_seed(config: SosConfig, seed: u64) -> Self {
        Self::with_rng(config, &mut SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: SosConfig, rng: &mut SmallRng) -> Self {
        Self {
            config,
            phases_x: draw_phases(rng),
            phases_y: draw_phases(rng),
            state: TaskState::Idle,
            elapsed: 0.0,
            sum_sq_x: 0.0,
            sum_sq_y: 0.0,
            samples: 0,
        }
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Phase vectors (X, Y), each in [0, 2π).
    pub fn phases(&self) -> (&[f64; 6], &[f64; 6]) {
        (&self.phases_x, &self.phases_y)
    }

    /// Reference target at task time τ [s].
    #[inline]
    pub fn target(&self, tau: f64) -> (f64, f64) {
        (
            axis_target(&SOS_FREQS_X, &self.phases_x, self.config.base_amplitude, tau),
            axis_target(&SOS_FREQS_Y, &self.phases_y, self.config.base_amplitude, tau),
        )
    }

    /// Advance one tick: accumulate squared error against the reference,
    /// complete once the trial duration is reached.
    pub fn update(&mut self, cursor: &PlantState, dt: f64) -> TaskState {
        match self.state {
            TaskState::Idle => self.state = TaskState::Running,
            TaskState::Running => {}
            _ => return self.state,
        }

        self.elapsed += dt;
        let (tx, ty) = self.target(self.elapsed);
        let ex = cursor.cx - tx;
        let ey = cursor.cy - ty;
        self.sum_sq_x += ex * ex;
        self.sum_sq_y += ey * ey;
        self.samples += 1;

        if self.elapsed >= self.config.duration {
            self.state = TaskState::Completed;
        }
        self.state
    }

    /// Back to Idle; accumulators zeroed and phases redrawn from fresh
    /// entropy. Reconstruct with [`SosTask::with_seed`] when the same
    /// reference must recur across resets.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Promote Running to Completed at run teardown.
    pub fn finish(&mut self) {
        if self.state == TaskState::Running {
            self.state = TaskState::Completed;
        }
    }

    /// Current error report.
    pub fn metrics(&self) -> SosMetrics {
        let n = self.samples.max(1) as f64;
        SosMetrics {
            rmse_x: (self.sum_sq_x / n).sqrt(),
            rmse_y: (self.sum_sq_y / n).sqrt(),
            rmse_total: ((self.sum_sq_x + self.sum_sq_y) / n).sqrt(),
            samples: self.samples,
        }
    }
}

#[inline]
fn axis_target(freqs: &[f64; 6], phases: &[f64; 6], base_amplitude: f64, tau: f64) -> f64 {
    let mut sum = 0.0;
    for (f, phi) in freqs.iter().zip(phases) {
        sum += base_amplitude / f * (std::f64::consts::TAU * f * tau + phi).sin();
    }
    sum
}

fn draw_phases(rng: &mut SmallRng) -> [f64; 6] {
    std::array::from_fn(|_| rng.random_range(0.0..std::f64::consts::TAU))
}

// ─── Tests ──────────────────────────────────────────────────────────
