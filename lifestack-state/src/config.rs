//! Configuration for state managers and the coordinator.

use std::time::Duration;

/// Configuration for a single state manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum age of the last successful sync before the manager's health
    /// degrades to a warning.
    pub staleness_threshold: Duration,
    /// The acting user, stamped onto emitted change events.
    pub user_id: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            staleness_threshold: Duration::from_secs(30 * 60),
            user_id: None,
        }
    }
}

/// Configuration for the global coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Period of the background reconciliation pass.
    pub sync_interval: Duration,
    /// Configuration applied to every domain manager the coordinator
    /// assembles.
    pub manager: ManagerConfig,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(300),
            manager: ManagerConfig::default(),
        }
    }
}
