//! Derived health reporting for state managers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The health of a state manager, derived on demand from its last recorded
/// error and the age of its last successful sync. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum HealthStatus {
    /// Operating normally and recently synchronized.
    Healthy,
    /// Degraded but serviceable, e.g. no sync within the staleness window.
    Warning(String),
    /// The last operation failed; cached reads are still served.
    Error(String),
}

impl HealthStatus {
    /// Returns true if the status is `Healthy`.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Returns true if the status is `Error`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, HealthStatus::Error(_))
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => f.write_str("healthy"),
            HealthStatus::Warning(reason) => write!(f, "warning: {reason}"),
            HealthStatus::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
