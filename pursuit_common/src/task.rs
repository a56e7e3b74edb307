//! Task identifiers and lifecycle states.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an experiment task.
///
/// Serialized as `u32` on the wire. `Completed` and `Failed` are terminal:
/// once reached, a task does not transition again until reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum TaskState {
    /// Created, not yet updated.
    #[default]
    Idle = 0,
    /// Actively updating each tick.
    Running = 1,
    /// Suspended; updates are ignored.
    Paused = 2,
    /// Terminal: finished normally.
    Completed = 3,
    /// Terminal: finished by divergence or loss of control.
    Failed = 4,
}

impl TaskState {
    /// Wire representation.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Inverse of [`TaskState::as_u32`]; `None` for unknown discriminants.
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Idle),
            1 => Some(Self::Running),
            2 => Some(Self::Paused),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the state is terminal (no further transitions until reset).
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Which experiment task the control loop runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Sum-of-sines pursuit tracking.
    Sos,
    /// Critical-instability tracking.
    Cit,
    /// Fitts' law target acquisition (ISO 9241-9 ring).
    Fitts,
}

impl TaskType {
    /// Lenient parse of a CLI or config task name.
    ///
    /// Returns `None` for unknown names; the caller decides the fallback.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sos" => Some(Self::Sos),
            "cit" => Some(Self::Cit),
            "fitts" => Some(Self::Fitts),
            _ => None,
        }
    }

    /// Canonical lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sos => "sos",
            Self::Cit => "cit",
            Self::Fitts => "fitts",
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_discriminants_are_stable() {
        assert_eq!(TaskState::Idle.as_u32(), 0);
        assert_eq!(TaskState::Running.as_u32(), 1);
        assert_eq!(TaskState::Paused.as_u32(), 2);
        assert_eq!(TaskState::Completed.as_u32(), 3);
        assert_eq!(TaskState::Failed.as_u32(), 4);
    }

    #[test]
    fn u32_round_trip() {
        for raw in 0..5 {
            let state = TaskState::from_u32(raw).unwrap();
            assert_eq!(state.as_u32(), raw);
        }
        assert_eq!(TaskState::from_u32(5), None);
        assert_eq!(TaskState::from_u32(u32::MAX), None);
    }

    #[test]
    fn terminal_states() {
        assert!(!TaskState::Idle.is_terminal());
        assert!(!TaskState::Running.is_terminal());
        assert!(!TaskState::Paused.is_terminal());
        assert!(TaskState::Completed.is_terminal());
        assert!(TaskState::Failed.is_terminal());
    }

    #[test]
    fn task_names_parse() {
        assert_eq!(TaskType::parse("sos"), Some(TaskType::Sos));
        assert_eq!(TaskType::parse("CIT"), Some(TaskType::Cit));
        assert_eq!(TaskType::parse(" fitts "), Some(TaskType::Fitts));
        assert_eq!(TaskType::parse("pong"), None);
        assert_eq!(TaskType::parse(""), None);
    }

    #[test]
    fn name_parse_round_trip() {
        for kind in [TaskType::Sos, TaskType::Cit, TaskType::Fitts] {
            assert_eq!(TaskType::parse(kind.name()), Some(kind));
        }
    }
}
