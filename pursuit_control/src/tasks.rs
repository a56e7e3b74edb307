//! Experiment task state machines and their target generators.
//!
//! The three tasks share the capability set {target(τ), update(state, dt),
//! reset, is_complete, metrics}. The task identity is stable across a run,
//! so dispatch is a tagged enum rather than a trait object in the hot path.
//! Metrics are heterogeneous and modelled the same way.

pub mod cit;
pub mod fitts;
pub mod sos;

use serde::Serialize;

use pursuit_common::plant::{Force2D, PlantState};
use pursuit_common::task::{TaskState, TaskType};

use crate::operator::OperatorDevice;

pub use cit::{CitConfig, CitMetrics, CitTask};
pub use fitts::{FittsConfig, FittsMetrics, FittsTask};
pub use sos::{SosConfig, SosMetrics, SosTask};

/// One experiment task.
#[derive(Debug)]
pub enum Task {
    /// Sum-of-sines pursuit tracking.
    Sos(SosTask),
    /// Critical-instability tracking.
    Cit(CitTask),
    /// Fitts' law target acquisition.
    Fitts(FittsTask),
}

/// Per-task metric records, reported at run end.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum TaskMetrics {
    /// Sum-of-sines tracking error.
    Sos(SosMetrics),
    /// Critical-instability outcome.
    Cit(CitMetrics),
    /// Fitts throughput.
    Fitts(FittsMetrics),
}

impl Task {
    /// Create a task of the given kind with its default configuration.
    pub fn from_type(kind: TaskType) -> Self {
        match kind {
            TaskType::Sos => Self::Sos(SosTask::new(SosConfig::default())),
            TaskType::Cit => Self::Cit(CitTask::new(CitConfig::default())),
            TaskType::Fitts => Self::Fitts(FittsTask::new(FittsConfig::default())),
        }
    }

    /// Which kind this task is.
    pub fn kind(&self) -> TaskType {
        match self {
            Self::Sos(_) => TaskType::Sos,
            Self::Cit(_) => TaskType::Cit,
            Self::Fitts(_) => TaskType::Fitts,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TaskState {
        match self {
            Self::Sos(task) => task.state(),
            Self::Cit(task) => task.state(),
            Self::Fitts(task) => task.state(),
        }
    }

    /// Reference target at task time τ [s].
    #[inline]
    pub fn target(&self, tau: f64) -> (f64, f64) {
        match self {
            Self::Sos(task) => task.target(tau),
            Self::Cit(task) => task.target(tau),
            Self::Fitts(task) => task.target(tau),
        }
    }

    /// Advance the task one tick against the cursor state.
    #[inline]
    pub fn update(&mut self, cursor: &PlantState, dt: f64) -> TaskState {
        match self {
            Self::Sos(task) => task.update(cursor, dt),
            Self::Cit(task) => task.update(cursor, dt),
            Self::Fitts(task) => task.update(cursor, dt),
        }
    }

    /// Tasks that integrate their own plant advance it here and return the
    /// cursor projection plus the force injected; the default second-order
    /// plant is bypassed for them. `None` for tasks driven by the default
    /// plant.
    #[inline]
    pub fn drive_own_plant(
        &mut self,
        operator: &mut OperatorDevice,
        dt: f64,
    ) -> Option<(PlantState, Force2D)> {
        match self {
            Self::Cit(task) => Some(task.drive(operator, dt)),
            Self::Sos(_) | Self::Fitts(_) => None,
        }
    }

    /// Back to Idle with zeroed accumulators.
    pub fn reset(&mut self) {
        match self {
            Self::Sos(task) => task.reset(),
            Self::Cit(task) => task.reset(),
            Self::Fitts(task) => task.reset(),
        }
    }

    /// Whether the task reached a terminal state.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.state().is_terminal()
    }

    /// Promote a still-running task to Completed at run teardown.
    pub fn finish(&mut self) {
        match self {
            Self::Sos(task) => task.finish(),
            Self::Cit(task) => task.finish(),
            Self::Fitts(task) => task.finish(),
        }
    }

    /// Current metrics snapshot.
    pub fn metrics(&self) -> TaskMetrics {
        match self {
            Self::Sos(task) => TaskMetrics::Sos(task.metrics()),
            Self::Cit(task) => TaskMetrics::Cit(task.metrics()),
            Self::Fitts(task) => TaskMetrics::Fitts(task.metrics()),
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
