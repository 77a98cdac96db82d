//! Change events for cross-domain state notification.
//!
//! A `ChangeEvent` describes one mutation that happened inside a state
//! manager. Events are immutable once constructed; the coordinator drains
//! them from the owning manager's queue and fans them out to every *other*
//! manager during a global sync pass.
//!
//! The payload carries just enough primitive data for a consumer to react
//! (the affected entity id, a display name) — never full entity content.

use crate::{Domain, EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Stable payload key carrying the affected entity's id.
///
/// Present in every `Create`, `Update`, and `Delete` event.
pub const ENTITY_ID_KEY: &str = "entity_id";

/// Payload key carrying a human-readable display name for the entity.
pub const NAME_KEY: &str = "name";

/// Unique identifier for a change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// The kind of mutation a change event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// A new entity was created.
    Create,
    /// An existing entity was replaced.
    Update,
    /// An entity was removed.
    Delete,
    /// A manager completed a sync pass.
    Sync,
    /// A manager's local state was cleared.
    Reset,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
            ChangeKind::Sync => "sync",
            ChangeKind::Reset => "reset",
        };
        f.write_str(s)
    }
}

/// A primitive payload value carried by a change event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayloadValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating-point value.
    Float(f64),
}

impl PayloadValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PayloadValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PayloadValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the float value, if this is a float.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PayloadValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl From<&str> for PayloadValue {
    fn from(s: &str) -> Self {
        PayloadValue::Str(s.to_string())
    }
}

impl From<String> for PayloadValue {
    fn from(s: String) -> Self {
        PayloadValue::Str(s)
    }
}

impl From<i64> for PayloadValue {
    fn from(i: i64) -> Self {
        PayloadValue::Int(i)
    }
}

impl From<f64> for PayloadValue {
    fn from(f: f64) -> Self {
        PayloadValue::Float(f)
    }
}

/// An immutable notification describing one mutation inside a state manager.
///
/// Events are the unit of cross-domain fan-out. Within one manager they are
/// queued in the order their causing operations completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unique identifier for this event.
    pub id: EventId,

    /// When this event was created.
    pub timestamp: Timestamp,

    /// The domain the mutation happened in.
    pub domain: Domain,

    /// Stable id of the manager that emitted the event. Used by the
    /// coordinator to exclude the origin during fan-out.
    pub source_manager: String,

    /// The kind of mutation.
    pub kind: ChangeKind,

    /// String-keyed primitive payload. `Create`/`Update`/`Delete` always
    /// carry the affected entity id under [`ENTITY_ID_KEY`].
    pub payload: BTreeMap<String, PayloadValue>,

    /// The user who triggered the mutation, if known.
    pub user_id: Option<String>,
}

impl ChangeEvent {
    fn new(
        domain: Domain,
        source_manager: impl Into<String>,
        kind: ChangeKind,
        payload: BTreeMap<String, PayloadValue>,
        user_id: Option<String>,
    ) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Timestamp::now(),
            domain,
            source_manager: source_manager.into(),
            kind,
            payload,
            user_id,
        }
    }

    /// Creates a `Create` event carrying the entity's id and display name.
    #[must_use]
    pub fn created(
        domain: Domain,
        source_manager: impl Into<String>,
        entity_id: EntityId,
        name: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        let mut payload = BTreeMap::new();
        payload.insert(ENTITY_ID_KEY.to_string(), entity_id.to_string().into());
        payload.insert(NAME_KEY.to_string(), PayloadValue::Str(name.into()));
        Self::new(domain, source_manager, ChangeKind::Create, payload, user_id)
    }

    /// Creates an `Update` event carrying the entity's id and display name.
    #[must_use]
    pub fn updated(
        domain: Domain,
        source_manager: impl Into<String>,
        entity_id: EntityId,
        name: impl Into<String>,
        user_id: Option<String>,
    ) -> Self {
        let mut payload = BTreeMap::new();
        payload.insert(ENTITY_ID_KEY.to_string(), entity_id.to_string().into());
        payload.insert(NAME_KEY.to_string(), PayloadValue::Str(name.into()));
        Self::new(domain, source_manager, ChangeKind::Update, payload, user_id)
    }

    /// Creates a `Delete` event. The payload always carries the deleted
    /// entity's id; the display name is included when still known.
    #[must_use]
    pub fn deleted(
        domain: Domain,
        source_manager: impl Into<String>,
        entity_id: EntityId,
        name: Option<String>,
        user_id: Option<String>,
    ) -> Self {
        let mut payload = BTreeMap::new();
        payload.insert(ENTITY_ID_KEY.to_string(), entity_id.to_string().into());
        if let Some(name) = name {
            payload.insert(NAME_KEY.to_string(), PayloadValue::Str(name));
        }
        Self::new(domain, source_manager, ChangeKind::Delete, payload, user_id)
    }

    /// Creates a `Sync` announcement event with an empty payload.
    #[must_use]
    pub fn synced(domain: Domain, source_manager: impl Into<String>) -> Self {
        Self::new(domain, source_manager, ChangeKind::Sync, BTreeMap::new(), None)
    }

    /// Creates a `Reset` announcement event with an empty payload.
    #[must_use]
    pub fn reset(domain: Domain, source_manager: impl Into<String>) -> Self {
        Self::new(domain, source_manager, ChangeKind::Reset, BTreeMap::new(), None)
    }

    /// Extracts the affected entity id from the payload, if present and
    /// well-formed.
    #[must_use]
    pub fn entity_id(&self) -> Option<EntityId> {
        self.payload
            .get(ENTITY_ID_KEY)
            .and_then(PayloadValue::as_str)
            .and_then(|s| EntityId::parse(s).ok())
    }

    /// Extracts the display name from the payload, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.payload.get(NAME_KEY).and_then(PayloadValue::as_str)
    }
}
