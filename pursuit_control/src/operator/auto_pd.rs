//! Synthetic PD operator with Gaussian force noise.
//!
//! Per axis, `u = Kp·(t − c) − Kd·v + σ·ξ` with ξ a fresh standard-normal
//! draw per call per axis. The derivative term treats the setpoint as
//! stationary, so it acts as a pure velocity damper even while the target
//! moves. With σ = 0 the device is fully deterministic.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use pursuit_common::config::AutoPdConfig;
use pursuit_common::plant::{Force2D, PlantState};

/// Deterministic-by-default PD force generator.
#[derive(Debug)]
pub struct AutoPd {
    target_x: f64,
    target_y: f64,
    kp: f64,
    kd: f64,
    noise_sigma: f64,
    rng: SmallRng,
}

impl AutoPd {
    /// Construct with OS-entropy noise seeding.
    pub fn new(kp: f64, kd: f64, noise_sigma: f64) -> Self {
        Self {
            target_x: 0.0,
            target_y: 0.0,
            kp,
            kd,
            noise_sigma,
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Construct with a fixed noise seed for reproducible runs.
    pub fn with_seed(kp: f64, kd: f64, noise_sigma: f64, seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            ..Self::new(kp, kd, noise_sigma)
        }
    }

    /// Build from configuration, honouring an optional seed.
    pub fn from_config(config: &AutoPdConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(config.kp, config.kd, config.noise_sigma, seed),
            None => Self::new(config.kp, config.kd, config.noise_sigma),
        }
    }

    /// Move the setpoint [m].
    #[inline]
    pub fn set_target(&mut self, tx: f64, ty: f64) {
        self.target_x = tx;
        self.target_y = ty;
    }

    /// Current setpoint [m].
    #[inline]
    pub fn target(&self) -> (f64, f64) {
        (self.target_x, self.target_y)
    }

    /// Produce this tick's force from the plant state.
    #[inline]
    pub fn compute_input(&mut self, state: &PlantState) -> Force2D {
        let mut ux = self.kp * (self.target_x - state.cx) - self.kd * state.vx;
        let mut uy = self.kp * (self.target_y - state.cy) - self.kd * state.vy;
        if self.noise_sigma > 0.0 {
            let nx: f64 = self.rng.sample(StandardNormal);
            let ny: f64 = self.rng.sample(StandardNormal);
            ux += self.noise_sigma * nx;
            uy += self.noise_sigma * ny;
        }
        Force2D::new(ux, uy)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
