//! Task lifecycle states.
//!
//! The store carries states as free-form strings (`pending`, `active`,
//! `successful`). Internally they are a closed enum; anything else on the
//! wire is a data-integrity error, never a silent "unknown".

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle state of a task.
///
/// # State Machine
/// ```text
/// (unset) -> Pending -> Active -> Successful
/// ```
/// `Successful` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Waiting for its required task (or for the initial activation pass).
    Pending,
    /// Conditions are being checked.
    Active,
    /// All conditions held; nothing left to do.
    Successful,
}

impl TaskState {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Pending => "pending",
            TaskState::Active => "active",
            TaskState::Successful => "successful",
        }
    }

    /// Terminal states permit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Successful)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a stored state string is not one of the known states.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task state `{0}`")]
pub struct StateParseError(pub String);

impl FromStr for TaskState {
    type Err = StateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskState::Pending),
            "active" => Ok(TaskState::Active),
            "successful" => Ok(TaskState::Successful),
            other => Err(StateParseError(other.to_string())),
        }
    }
}

impl Serialize for TaskState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_states() {
        assert_eq!("pending".parse::<TaskState>().unwrap(), TaskState::Pending);
        assert_eq!("active".parse::<TaskState>().unwrap(), TaskState::Active);
        assert_eq!(
            "successful".parse::<TaskState>().unwrap(),
            TaskState::Successful
        );
    }

    #[test]
    fn rejects_unknown_states() {
        let err = "error".parse::<TaskState>().unwrap_err();
        assert_eq!(err, StateParseError("error".to_string()));
        assert!(serde_json::from_str::<TaskState>("\"done\"").is_err());
    }

    #[test]
    fn wire_round_trip() {
        let json = serde_json::to_string(&TaskState::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let back: TaskState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskState::Active);
    }

    #[test]
    fn only_successful_is_terminal() {
        assert!(TaskState::Successful.is_terminal());
        assert!(!TaskState::Pending.is_terminal());
        assert!(!TaskState::Active.is_terminal());
    }
}
