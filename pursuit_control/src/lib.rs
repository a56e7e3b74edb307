//! Pursuit Control Core
//!
//! Soft-real-time control core for a 2D tracking platform: a fixed-period
//! cycle runner drives a simulated second-order plant at 1 kHz, evaluates
//! one of three psychophysics tasks, and emits the complete per-tick state
//! over UDP to an external viewer.
//!
//! # Module Structure
//!
//! - [`dynamics`] - RK4/Euler integrators for the second-order plant
//! - [`operator`] - Input-producing devices (synthetic PD, keyboard bridge)
//! - [`tasks`] - The three task state machines and their targets/metrics
//! - [`state`] - Mutable tick state and its wire projection
//! - [`emitter`] - Best-effort UDP state emitter
//! - [`cycle`] - The period-accurate control loop and timing statistics
//! - [`error`] - Fatal construction errors

pub mod cycle;
pub mod dynamics;
pub mod emitter;
pub mod error;
pub mod operator;
pub mod state;
pub mod tasks;

pub use cycle::{ControlLoop, CycleStats, CycleStatsSummary};
pub use error::ControlError;
pub use state::ExperimentState;
pub use tasks::{Task, TaskMetrics};
