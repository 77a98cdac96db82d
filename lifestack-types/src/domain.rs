//! The bounded business areas the state layer coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the bounded business areas, each owning its own entity type and
/// state manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Habit tracking.
    Habit,
    /// Personal finances.
    Financial,
    /// Day planning / tasks.
    Planner,
}

impl Domain {
    /// All domains in the fixed, deterministic order used wherever managers
    /// are iterated (initialization, sync passes, fan-out).
    #[must_use]
    pub const fn all() -> [Domain; 3] {
        [Domain::Habit, Domain::Financial, Domain::Planner]
    }

    /// The stable string tag for this domain.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Domain::Habit => "habit",
            Domain::Financial => "financial",
            Domain::Planner => "planner",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized domain tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown domain: {0}")]
pub struct UnknownDomain(pub String);

impl FromStr for Domain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "habit" => Ok(Domain::Habit),
            "financial" => Ok(Domain::Financial),
            "planner" => Ok(Domain::Planner),
            other => Err(UnknownDomain(other.to_string())),
        }
    }
}
