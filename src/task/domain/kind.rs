//! Task type and urgency enumerations.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of help requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Medical aid or first aid.
    Medical,
    /// Rides and moving goods.
    Transport,
    /// Shopping and deliveries.
    Shopping,
    /// Anything else.
    General,
}

impl TaskKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Medical => "medical",
            Self::Transport => "transport",
            Self::Shopping => "shopping",
            Self::General => "general",
        }
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "medical" => Ok(Self::Medical),
            "transport" => Ok(Self::Transport),
            "shopping" => Ok(Self::Shopping),
            "general" => Ok(Self::General),
            _ => Err(TaskDomainError::UnknownTaskKind(value.to_owned())),
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly help is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Needed now.
    High,
    /// Needed soon.
    Medium,
    /// No rush.
    Low,
}

impl Urgency {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl TryFrom<&str> for Urgency {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(TaskDomainError::UnknownUrgency(value.to_owned())),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
