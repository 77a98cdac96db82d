//! Core type definitions for the LifeStack state layer.
//!
//! This crate defines the fundamental, domain-agnostic types shared by the
//! state managers and the global coordinator:
//! - Entity and change-event identifiers (UUID v7)
//! - Wall-clock timestamps with staleness helpers
//! - The `Domain` tag for the bounded business areas
//! - `ChangeEvent`, the unit of cross-domain notification
//! - `HealthStatus`, the derived per-manager health report
//!
//! Domain-specific entity types (habits, transactions, planner tasks) belong
//! in `lifestack-model`, not here.

mod domain;
mod event;
mod health;
mod ids;
mod timestamp;

pub use domain::{Domain, UnknownDomain};
pub use event::{ChangeEvent, ChangeKind, EventId, PayloadValue, ENTITY_ID_KEY, NAME_KEY};
pub use health::HealthStatus;
pub use ids::EntityId;
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("unknown domain: {0}")]
    UnknownDomain(#[from] UnknownDomain),
}
