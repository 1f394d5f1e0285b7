use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HelpdeskError;

/// Lifecycle status of a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Open,
    InProgress,
    Resolved,
    Closed,
}

/// Canonical lifecycle order. A ticket may only move to the entry directly
/// after its current one.
pub const STATUS_ORDER: [Status; 4] = [
    Status::Open,
    Status::InProgress,
    Status::Resolved,
    Status::Closed,
];

impl Status {
    /// Position in [`STATUS_ORDER`]
    #[must_use]
    pub fn index(self) -> Option<usize> {
        STATUS_ORDER.iter().position(|s| *s == self)
    }

    /// The only status this one may advance to, if any
    #[must_use]
    pub fn next(self) -> Option<Self> {
        let index = self.index()?;
        STATUS_ORDER.get(index + 1).copied()
    }

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// The whole canonical sequence, for messages
    #[must_use]
    pub fn sequence() -> String {
        STATUS_ORDER
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        STATUS_ORDER
            .iter()
            .copied()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| {
                HelpdeskError::InvalidInput(format!(
                    "Invalid status: {s}. Must be one of: {}",
                    STATUS_ORDER.map(Self::as_str).join(", ")
                ))
            })
    }
}

/// Ticket priority. Independent of the lifecycle; any value may be set at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(HelpdeskError::InvalidInput(format!(
                "Invalid priority: {s}. Must be one of: low, medium, high, critical"
            ))),
        }
    }
}
