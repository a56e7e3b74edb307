//! Pursuit Common Library
//!
//! Shared types for the pursuit tracking workspace: the simulated plant
//! state and parameters, task identifiers and lifecycle states, the
//! fixed-layout wire frame the control core emits every tick, and the
//! experiment configuration with its TOML loader.
//!
//! # Module Structure
//!
//! - [`plant`] - Plant state, force input and per-axis mechanical parameters
//! - [`task`] - Task identifiers and lifecycle states
//! - [`protocol`] - 64-byte little-endian state frame codec
//! - [`config`] - Experiment configuration, defaults, validation, TOML loading

pub mod config;
pub mod plant;
pub mod protocol;
pub mod task;
