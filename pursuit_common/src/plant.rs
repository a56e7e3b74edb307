//! Plant state, force input and per-axis mechanical parameters.
//!
//! The simulated plant is a pair of fully decoupled second-order axes,
//! `M·c̈ + B·ċ + K·c = u`. State is value-typed: an integrator step consumes
//! a state and produces a new one, so ticks never alias.

use serde::{Deserialize, Serialize};

/// Second-order plant state: position [m] and velocity [m/s] per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlantState {
    /// X position [m].
    pub cx: f64,
    /// Y position [m].
    pub cy: f64,
    /// X velocity [m/s].
    pub vx: f64,
    /// Y velocity [m/s].
    pub vy: f64,
}

impl PlantState {
    /// The origin at rest.
    pub const ZERO: Self = Self {
        cx: 0.0,
        cy: 0.0,
        vx: 0.0,
        vy: 0.0,
    };

    /// Construct a state from positions and velocities.
    #[inline]
    pub const fn new(cx: f64, cy: f64, vx: f64, vy: f64) -> Self {
        Self { cx, cy, vx, vy }
    }

    /// Euclidean distance of the position from the origin [m].
    #[inline]
    pub fn distance_from_origin(&self) -> f64 {
        self.cx.hypot(self.cy)
    }
}

/// Force input to the plant [N] per axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Force2D {
    /// X force [N].
    pub ux: f64,
    /// Y force [N].
    pub uy: f64,
}

impl Force2D {
    /// Zero force.
    pub const ZERO: Self = Self { ux: 0.0, uy: 0.0 };

    /// Construct a force vector.
    #[inline]
    pub const fn new(ux: f64, uy: f64) -> Self {
        Self { ux, uy }
    }
}

/// Mechanical parameters of one plant axis. Immutable after construction.
///
/// Validity (`mass > 0`, `damping >= 0`, `stiffness >= 0`) is enforced by
/// [`crate::config::ExperimentConfig::validate`]; the integrator itself
/// assumes valid parameters and never traps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisParams {
    /// Mass [kg], > 0.
    pub mass: f64,
    /// Viscous damping [N·s/m], >= 0.
    pub damping: f64,
    /// Stiffness [N/m], >= 0.
    pub stiffness: f64,
}

impl Default for AxisParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            damping: 5.0,
            stiffness: 0.0,
        }
    }
}

impl AxisParams {
    /// Construct axis parameters.
    #[inline]
    pub const fn new(mass: f64, damping: f64, stiffness: f64) -> Self {
        Self {
            mass,
            damping,
            stiffness,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_state_is_origin_at_rest() {
        let s = PlantState::ZERO;
        assert_eq!(s.cx, 0.0);
        assert_eq!(s.cy, 0.0);
        assert_eq!(s.vx, 0.0);
        assert_eq!(s.vy, 0.0);
        assert_eq!(s.distance_from_origin(), 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let s = PlantState::new(0.03, 0.04, 1.0, -1.0);
        assert!((s.distance_from_origin() - 0.05).abs() < 1e-15);
    }

    #[test]
    fn default_axis_params() {
        let p = AxisParams::default();
        assert_eq!(p.mass, 1.0);
        assert_eq!(p.damping, 5.0);
        assert_eq!(p.stiffness, 0.0);
    }
}
