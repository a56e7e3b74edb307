//! Experiment configuration: defaults, TOML loading and validation.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock 1 kHz experiment. Unknown fields are rejected to catch typos.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plant::AxisParams;

/// Error type for configuration loading and validation.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read configuration: {0}")]
    Io(String),

    /// TOML parsing failed (includes unknown fields).
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Which device produces the per-tick force input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Synthetic PD controller with optional Gaussian noise.
    AutoPd,
    /// External human input via the keyboard datagram bridge.
    Keyboard,
}

/// Gains and noise for the synthetic PD operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutoPdConfig {
    /// Proportional gain [N/m].
    pub kp: f64,
    /// Velocity damping gain [N·s/m].
    pub kd: f64,
    /// Gaussian force noise scale [N], >= 0. Zero makes the device
    /// fully deterministic.
    pub noise_sigma: f64,
    /// Optional RNG seed for reproducible noise.
    pub seed: Option<u64>,
}

impl Default for AutoPdConfig {
    fn default() -> Self {
        Self {
            kp: 10.0,
            kd: 5.0,
            noise_sigma: 0.1,
            seed: None,
        }
    }
}

/// Keyboard bridge settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyboardConfig {
    /// UDP port the bridge datagrams arrive on.
    pub port: u16,
    /// Force applied per pressed direction [N].
    pub force_scale: f64,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            port: 12346,
            force_scale: 1.0,
        }
    }
}

/// Top-level experiment configuration.
///
/// `dt` is derived as `1 / control_rate_hz`, so `dt × control_rate_hz = 1`
/// holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Control rate [Hz].
    pub control_rate_hz: f64,
    /// X-axis plant parameters.
    pub plant_x: AxisParams,
    /// Y-axis plant parameters.
    pub plant_y: AxisParams,
    /// State-emission destination host.
    pub emit_host: String,
    /// State-emission destination port.
    pub emit_port: u16,
    /// Force-producing device.
    pub operator: OperatorKind,
    /// Synthetic operator settings.
    pub auto_pd: AutoPdConfig,
    /// Keyboard bridge settings.
    pub keyboard: KeyboardConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            control_rate_hz: 1000.0,
            plant_x: AxisParams::default(),
            plant_y: AxisParams::default(),
            emit_host: "127.0.0.1".to_string(),
            emit_port: 12345,
            operator: OperatorKind::AutoPd,
            auto_pd: AutoPdConfig::default(),
            keyboard: KeyboardConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Tick period [s].
    #[inline]
    pub fn dt(&self) -> f64 {
        1.0 / self.control_rate_hz
    }

    /// Emission destination as `host:port`.
    pub fn emit_addr(&self) -> String {
        format!("{}:{}", self.emit_host, self.emit_port)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate semantic bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.control_rate_hz.is_finite() && self.control_rate_hz > 0.0) {
            return Err(ConfigError::Validation(format!(
                "control_rate_hz must be finite and > 0, got {}",
                self.control_rate_hz
            )));
        }
        for (name, params) in [("plant_x", &self.plant_x), ("plant_y", &self.plant_y)] {
            validate_axis(name, params)?;
        }
        if self.emit_host.is_empty() {
            return Err(ConfigError::Validation("emit_host cannot be empty".into()));
        }
        if self.emit_port == 0 {
            return Err(ConfigError::Validation("emit_port cannot be 0".into()));
        }
        if self.keyboard.port == 0 {
            return Err(ConfigError::Validation("keyboard.port cannot be 0".into()));
        }
        if !(self.keyboard.force_scale.is_finite() && self.keyboard.force_scale >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "keyboard.force_scale must be finite and >= 0, got {}",
                self.keyboard.force_scale
            )));
        }
        if !(self.auto_pd.kp.is_finite() && self.auto_pd.kd.is_finite()) {
            return Err(ConfigError::Validation(
                "auto_pd gains must be finite".into(),
            ));
        }
        if !(self.auto_pd.noise_sigma.is_finite() && self.auto_pd.noise_sigma >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "auto_pd.noise_sigma must be finite and >= 0, got {}",
                self.auto_pd.noise_sigma
            )));
        }
        Ok(())
    }
}

fn validate_axis(name: &str, params: &AxisParams) -> Result<(), ConfigError> {
    if !(params.mass.is_finite() && params.mass > 0.0) {
        return Err(ConfigError::Validation(format!(
            "{name}.mass must be finite and > 0, got {}",
            params.mass
        )));
    }
    if !(params.damping.is_finite() && params.damping >= 0.0) {
        return Err(ConfigError::Validation(format!(
            "{name}.damping must be finite and >= 0, got {}",
            params.damping
        )));
    }
    if !(params.stiffness.is_finite() && params.stiffness >= 0.0) {
        return Err(ConfigError::Validation(format!(
            "{name}.stiffness must be finite and >= 0, got {}",
            params.stiffness
        )));
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = ExperimentConfig::default();
        config.validate().unwrap();
        assert_eq!(config.control_rate_hz, 1000.0);
        assert_eq!(config.dt(), 1e-3);
        assert_eq!(config.emit_addr(), "127.0.0.1:12345");
        assert_eq!(config.operator, OperatorKind::AutoPd);
        assert_eq!(config.keyboard.port, 12346);
    }

    #[test]
    fn dt_times_rate_is_one() {
        for rate in [100.0, 500.0, 1000.0, 2000.0] {
            let config = ExperimentConfig {
                control_rate_hz: rate,
                ..Default::default()
            };
            assert!((config.dt() * config.control_rate_hz - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: ExperimentConfig = toml::from_str("").unwrap();
        assert_eq!(config, ExperimentConfig::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let config: ExperimentConfig = toml::from_str(
            r#"
            control_rate_hz = 500.0
            emit_port = 23456

            [plant_x]
            mass = 2.0

            [auto_pd]
            noise_sigma = 0.0
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(config.control_rate_hz, 500.0);
        assert_eq!(config.dt(), 2e-3);
        assert_eq!(config.emit_port, 23456);
        assert_eq!(config.plant_x.mass, 2.0);
        // Untouched plant_x fields keep their defaults.
        assert_eq!(config.plant_x.damping, 5.0);
        assert_eq!(config.auto_pd.noise_sigma, 0.0);
        assert_eq!(config.auto_pd.seed, Some(42));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result: Result<ExperimentConfig, _> = toml::from_str("contrl_rate_hz = 1000.0");
        assert!(result.is_err());
    }

    #[test]
    fn zero_mass_fails_validation() {
        let mut config = ExperimentConfig::default();
        config.plant_y.mass = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn negative_sigma_fails_validation() {
        let mut config = ExperimentConfig::default();
        config.auto_pd.noise_sigma = -0.1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "control_rate_hz = 250.0").unwrap();
        let config = ExperimentConfig::load(file.path()).unwrap();
        assert_eq!(config.control_rate_hz, 250.0);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let result = ExperimentConfig::load(Path::new("/nonexistent/pursuit.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn operator_kind_parses_from_toml() {
        let config: ExperimentConfig = toml::from_str(r#"operator = "keyboard""#).unwrap();
        assert_eq!(config.operator, OperatorKind::Keyboard);
    }
}
