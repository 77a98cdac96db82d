//! Error types for the state layer.

use lifestack_model::ServiceError;
use lifestack_storage::StorageError;
use thiserror::Error;

/// Result type for state-layer operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur in state-layer operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// The underlying domain service call failed. Propagated verbatim to
    /// the manager's caller and recorded as the manager's last error.
    #[error("domain service call failed: {0}")]
    Service(#[from] ServiceError),

    /// A checkpoint read/write failed. Propagated on `initialize` and
    /// explicit save/load; swallowed during best-effort cleanup.
    #[error("checkpoint persistence failed: {0}")]
    Persistence(#[from] StorageError),

    /// A coordinator method was called in the wrong lifecycle phase.
    #[error("invalid coordinator state: {0}")]
    InvalidState(String),

    /// One manager's piece of a global sync pass failed after earlier
    /// managers may already have been updated. Fan-out is not rolled back.
    #[error("sync pass failed at manager {manager}: {source}")]
    PartialSync {
        /// The manager whose step failed.
        manager: String,
        /// The underlying failure.
        #[source]
        source: Box<StateError>,
    },
}
