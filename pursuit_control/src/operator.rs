//! Uniform input-producing contract over operator device variants.
//!
//! The operator identity is stable for the life of a run, so dispatch is a
//! tagged enum rather than a trait object in the hot path.

pub mod auto_pd;
pub mod keyboard;

use pursuit_common::config::{ExperimentConfig, OperatorKind};
use pursuit_common::plant::{Force2D, PlantState};

use crate::error::ControlError;

pub use auto_pd::AutoPd;
pub use keyboard::{KeyState, KeyboardDevice};

/// The thing that produces force each tick.
#[derive(Debug)]
pub enum OperatorDevice {
    /// Synthetic PD controller with optional Gaussian noise.
    AutoPd(AutoPd),
    /// External human input via the keyboard datagram bridge.
    Keyboard(KeyboardDevice),
}

impl OperatorDevice {
    /// Build the device the configuration selects. Binding the keyboard
    /// bridge socket can fail fatally.
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, ControlError> {
        match config.operator {
            OperatorKind::AutoPd => Ok(Self::AutoPd(AutoPd::from_config(&config.auto_pd))),
            OperatorKind::Keyboard => Ok(Self::Keyboard(KeyboardDevice::bind(
                config.keyboard.port,
                config.keyboard.force_scale,
            )?)),
        }
    }

    /// Drain any pending external input. Scheduled at the head of the tick;
    /// no-op for the synthetic operator.
    #[inline]
    pub fn poll(&mut self) {
        match self {
            Self::AutoPd(_) => {}
            Self::Keyboard(device) => device.poll(),
        }
    }

    /// Move the setpoint. The keyboard device has no setpoint; the human
    /// tracks the target on screen.
    #[inline]
    pub fn set_target(&mut self, tx: f64, ty: f64) {
        match self {
            Self::AutoPd(device) => device.set_target(tx, ty),
            Self::Keyboard(_) => {}
        }
    }

    /// Produce this tick's force from the plant state the device sees.
    #[inline]
    pub fn compute_input(&mut self, state: &PlantState) -> Force2D {
        match self {
            Self::AutoPd(device) => device.compute_input(state),
            Self::Keyboard(device) => device.compute_input(state),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
