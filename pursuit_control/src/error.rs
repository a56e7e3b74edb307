//! Error types surfaced before the control loop begins.
//!
//! Steady-path transport failures are counted by the emitter and never
//! raised; everything here is fatal at construction time.

use pursuit_common::config::ConfigError;
use thiserror::Error;

/// Fatal startup error.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A socket could not be bound or configured.
    #[error("{role} socket setup failed: {source}")]
    Socket {
        /// Which socket failed ("emitter", "keyboard").
        role: &'static str,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// SIGINT handler installation failed.
    #[error("signal handler setup failed: {0}")]
    Signal(#[from] ctrlc::Error),
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_error_names_role() {
        let err = ControlError::Socket {
            role: "emitter",
            source: std::io::Error::new(std::io::ErrorKind::AddrInUse, "in use"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("emitter"));
    }

    #[test]
    fn config_error_is_transparent() {
        let err = ControlError::from(ConfigError::Validation("bad".into()));
        assert_eq!(format!("{err}"), "configuration validation failed: bad");
    }
}
