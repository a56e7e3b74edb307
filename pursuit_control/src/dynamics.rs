//! RK4 and Euler steps of the decoupled second-order plant.
//!
//! Each axis solves `M·c̈ + B·ċ + K·c = u` independently; there is no axis
//! coupling. The force is held constant across the RK4 sub-steps within a
//! tick (zero-order hold). Both steps are pure, total and allocation-free:
//! NaN in means NaN out, nothing traps, callers supply `M > 0`.

use pursuit_common::plant::{AxisParams, Force2D, PlantState};

/// Per-axis acceleration `(u − B·v − K·c) / M` [m/s²].
#[inline]
fn axis_accel(c: f64, v: f64, u: f64, p: &AxisParams) -> f64 {
    (u - p.damping * v - p.stiffness * c) / p.mass
}

/// One classical RK4 step of a single axis, returning (position, velocity).
///
/// The stage derivatives of the state pair (c, v) are (v, a); the four
/// stages are combined with the 1/6·(k1 + 2k2 + 2k3 + k4) weights for both
/// components.
#[inline]
fn axis_rk4(c: f64, v: f64, u: f64, p: &AxisParams, dt: f64) -> (f64, f64) {
    let k1v = v;
    let k1a = axis_accel(c, v, u, p);

    let k2v = v + 0.5 * dt * k1a;
    let k2a = axis_accel(c + 0.5 * dt * k1v, k2v, u, p);

    let k3v = v + 0.5 * dt * k2a;
    let k3a = axis_accel(c + 0.5 * dt * k2v, k3v, u, p);

    let k4v = v + dt * k3a;
    let k4a = axis_accel(c + dt * k3v, k4v, u, p);

    let sixth = dt / 6.0;
    (
        c + sixth * (k1v + 2.0 * k2v + 2.0 * k3v + k4v),
        v + sixth * (k1a + 2.0 * k2a + 2.0 * k3a + k4a),
    )
}

/// One RK4 step of the full two-axis plant.
#[inline]
pub fn step_rk4(
    state: &PlantState,
    px: &AxisParams,
    py: &AxisParams,
    input: &Force2D,
    dt: f64,
) -> PlantState {
    let (cx, vx) = axis_rk4(state.cx, state.vx, input.ux, px, dt);
    let (cy, vy) = axis_rk4(state.cy, state.vy, input.uy, py, dt);
    PlantState::new(cx, cy, vx, vy)
}

/// One forward-Euler step of the full two-axis plant.
///
/// First-order only; kept for cheaper sub-simulations that do not need
/// RK4 accuracy.
#[inline]
pub fn step_euler(
    state: &PlantState,
    px: &AxisParams,
    py: &AxisParams,
    input: &Force2D,
    dt: f64,
) -> PlantState {
    let ax = axis_accel(state.cx, state.vx, input.ux, px);
    let ay = axis_accel(state.cy, state.vy, input.uy, py);
    PlantState::new(
        state.cx + state.vx * dt,
        state.cy + state.vy * dt,
        state.vx + ax * dt,
        state.vy + ay * dt,
    )
}

// ─── Tests ──────────────────────────────────────────────────────────
