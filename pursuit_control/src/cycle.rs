//! Period-accurate cycle runner composing clock, task, operator, plant
//! and emitter.
//!
//! ## Tick body
//! 1. Advance the clock (monotonic reference taken at the first tick).
//! 2. Bump the loop counter.
//! 3. Drain external input (keyboard bridge), compute τ.
//! 4. Query the task target and stash it.
//! 5. Advance the plant: a task that owns its own dynamics drives it with
//!    the operator; otherwise the PD setpoint follows the target and the
//!    default second-order plant takes an RK4 step.
//! 6. Update the task state machine.
//! 7. Encode and send the state frame.
//! 8. Record the tick wall time.
//!
//! ## Pacing
//! The runner busy-waits on `Instant` until the tick period has elapsed;
//! OS sleep is far too coarse for a 1 ms period. τ is derived from the
//! tick counter, so two runs with a deterministic operator produce
//! identical streams; the wall clock only stamps the emitted frames.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use pursuit_common::config::ExperimentConfig;
use pursuit_common::task::TaskType;

use crate::dynamics;
use crate::emitter::{EmitterStats, UdpEmitter};
use crate::error::ControlError;
use crate::operator::OperatorDevice;
use crate::state::ExperimentState;
use crate::tasks::Task;

/// Per-tick timing samples retained for offline inspection.
pub const TICK_SAMPLE_CAP: usize = 10_000;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1)-per-tick timing statistics with a bounded sample buffer.
///
/// The buffer keeps the first [`TICK_SAMPLE_CAP`] tick durations; once
/// full, later ticks still advance the counters.
#[derive(Debug)]
pub struct CycleStats {
    /// Ticks executed.
    pub tick_count: u64,
    /// Longest tick [µs].
    pub max_tick_us: u32,
    /// Shortest tick [µs].
    pub min_tick_us: u32,
    /// Running sum for the average.
    sum_tick_us: u64,
    /// Ticks that exceeded the overrun threshold.
    pub overruns: u64,
    /// Overrun threshold [µs] (0.9 × tick period).
    pub overrun_threshold_us: u32,
    /// First-N tick durations [µs].
    pub tick_us: heapless::Vec<u32, TICK_SAMPLE_CAP>,
}

/// Serializable stats projection for the end-of-run report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleStatsSummary {
    /// Ticks executed.
    pub tick_count: u64,
    /// Longest tick [µs].
    pub max_tick_us: u32,
    /// Shortest tick [µs]; 0 when no tick ran.
    pub min_tick_us: u32,
    /// Mean tick [µs]; 0 when no tick ran.
    pub avg_tick_us: u32,
    /// Ticks above the overrun threshold.
    pub overruns: u64,
    /// Samples retained in the buffer.
    pub samples: usize,
}

impl CycleStats {
    /// Create zeroed stats with the given overrun threshold [µs].
    pub fn new(overrun_threshold_us: u32) -> Self {
        Self {
            tick_count: 0,
            max_tick_us: 0,
            min_tick_us: u32::MAX,
            sum_tick_us: 0,
            overruns: 0,
            overrun_threshold_us,
            tick_us: heapless::Vec::new(),
        }
    }

    /// Record one tick duration. Returns whether it was an overrun.
    #[inline]
    pub fn record(&mut self, tick_us: u32) -> bool {
        self.tick_count += 1;
        self.sum_tick_us += tick_us as u64;
        if tick_us > self.max_tick_us {
            self.max_tick_us = tick_us;
        }
        if tick_us < self.min_tick_us {
            self.min_tick_us = tick_us;
        }
        // Full buffer: drop the sample, keep counting.
        let _ = self.tick_us.push(tick_us);

        let overrun = tick_us > self.overrun_threshold_us;
        if overrun {
            self.overruns += 1;
        }
        overrun
    }

    /// Mean tick duration [µs].
    #[inline]
    pub fn avg_tick_us(&self) -> u32 {
        if self.tick_count == 0 {
            0
        } else {
            (self.sum_tick_us / self.tick_count) as u32
        }
    }

    /// Projection for reporting.
    pub fn summary(&self) -> CycleStatsSummary {
        CycleStatsSummary {
            tick_count: self.tick_count,
            max_tick_us: self.max_tick_us,
            min_tick_us: if self.tick_count == 0 {
                0
            } else {
                self.min_tick_us
            },
            avg_tick_us: self.avg_tick_us(),
            overruns: self.overruns,
            samples: self.tick_us.len(),
        }
    }
}

// ─── Control Loop ───────────────────────────────────────────────────

/// The main fixed-period runner. Owns all per-run state; nothing on the
/// steady path allocates.
pub struct ControlLoop {
    config: ExperimentConfig,
    dt: f64,
    period: Duration,
    state: ExperimentState,
    task: Task,
    operator: OperatorDevice,
    emitter: UdpEmitter,
    stats: CycleStats,
    running: Arc<AtomicBool>,
}

impl ControlLoop {
    /// Build a loop for the given task kind: validates the configuration,
    /// constructs the configured operator and binds the emitter socket.
    /// All failures here are fatal.
    pub fn new(config: ExperimentConfig, kind: TaskType) -> Result<Self, ControlError> {
        config.validate()?;
        let operator = OperatorDevice::from_config(&config)?;
        Self::with_parts(config, Task::from_type(kind), operator)
    }

    /// Build from pre-constructed parts (custom task parameters, seeded
    /// operators). The configuration must already be valid.
    pub fn with_parts(
        config: ExperimentConfig,
        task: Task,
        operator: OperatorDevice,
    ) -> Result<Self, ControlError> {
        let emitter = UdpEmitter::bind(&config.emit_addr())?;
        let dt = config.dt();
        let overrun_threshold_us = (0.9 * dt * 1e6) as u32;
        info!(
            "control loop ready: task={}, rate={} Hz, dest={}",
            task.kind().name(),
            config.control_rate_hz,
            config.emit_addr()
        );
        Ok(Self {
            config,
            dt,
            period: Duration::from_secs_f64(dt),
            state: ExperimentState::new(),
            task,
            operator,
            emitter,
            stats: CycleStats::new(overrun_threshold_us),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared flag a signal handler can clear to stop the run.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Current tick state.
    pub fn state(&self) -> &ExperimentState {
        &self.state
    }

    /// Current task.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Timing statistics.
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Emission counters.
    pub fn emitter_stats(&self) -> EmitterStats {
        self.emitter.stats()
    }

    /// Execute one tick (steps 1–7; the caller times step 8).
    pub fn step(&mut self) {
        self.state.tick_clock();
        self.state.loop_count += 1;

        // Logical task time from the tick counter keeps the dynamics
        // independent of scheduling jitter; the wall clock only stamps
        // the emitted frame.
        let tau = (self.state.loop_count - 1) as f64 * self.dt;

        self.operator.poll();

        let (tx, ty) = self.task.target(tau);
        self.state.target_x = tx;
        self.state.target_y = ty;
        self.operator.set_target(tx, ty);

        if let Some((cursor, input)) = self.task.drive_own_plant(&mut self.operator, self.dt) {
            self.state.cursor = cursor;
            self.state.last_input = input;
        } else {
            let input = self.operator.compute_input(&self.state.cursor);
            self.state.cursor = dynamics::step_rk4(
                &self.state.cursor,
                &self.config.plant_x,
                &self.config.plant_y,
                &input,
                self.dt,
            );
            self.state.last_input = input;
        }

        self.state.task_state = self.task.update(&self.state.cursor, self.dt);

        let msg = self.state.to_message();
        self.emitter.send(&msg);
    }

    /// Run for up to `duration_s` seconds of wall time, blocking.
    ///
    /// Exits when the running flag clears, the wall clock passes the
    /// duration, or the task reaches a terminal state. On exit the run
    /// is torn down: a still-Running task is promoted to Completed.
    pub fn run(&mut self, duration_s: f64) {
        self.state.trial_number += 1;
        self.state.running = true;
        self.running.store(true, Ordering::SeqCst);
        let end_us = (duration_s * 1e6) as u64;

        info!(
            "run start: task={}, trial={}, duration={duration_s}s",
            self.task.kind().name(),
            self.state.trial_number
        );

        while self.running.load(Ordering::SeqCst) {
            let tick_start = Instant::now();
            self.step();

            let tick_us = tick_start.elapsed().as_micros().min(u32::MAX as u128) as u32;
            if self.stats.record(tick_us)
                && (self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0)
            {
                warn!(
                    "tick overrun #{}: {tick_us}us (threshold {}us)",
                    self.stats.overruns, self.stats.overrun_threshold_us
                );
            }

            if self.task.is_complete() {
                info!("task reached {:?}", self.task.state());
                break;
            }
            if self.state.current_time_us >= end_us {
                break;
            }

            // Busy-wait out the remainder of the period; OS sleep is too
            // coarse at this rate.
            while tick_start.elapsed() < self.period {
                std::hint::spin_loop();
            }
        }

        self.running.store(false, Ordering::SeqCst);
        self.state.running = false;
        self.task.finish();
        self.state.task_state = self.task.state();

        let summary = self.stats.summary();
        info!(
            "run end: ticks={}, max={}us, avg={}us, overruns={}",
            summary.tick_count, summary.max_tick_us, summary.avg_tick_us, summary.overruns
        );
    }

    /// Ask a blocking [`ControlLoop::run`] to exit at the next tick head.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Swap in a freshly created task of `kind` and reset the run state.
    /// Calling it twice with the same kind is equivalent to calling once.
    pub fn set_task(&mut self, kind: TaskType) {
        info!("task set to {}", kind.name());
        self.task = Task::from_type(kind);
        self.state.reset();
        self.stats = CycleStats::new(self.stats.overrun_threshold_us);
    }

    /// Release the emitter socket. Idempotent; sends afterwards only
    /// count errors.
    pub fn close(&mut self) {
        self.emitter.close();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
