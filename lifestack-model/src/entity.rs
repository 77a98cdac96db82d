//! Concrete entity types, one per domain.
//!
//! Identity is immutable after creation; every other field is mutated only
//! by the domain service, and the state layer replaces cached entries
//! wholesale with whatever the service returns.

use lifestack_types::{Domain, EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Contract satisfied by every entity type a state manager can cache.
pub trait DomainEntity: Clone + Send + Sync + 'static {
    /// The domain this entity type belongs to.
    const DOMAIN: Domain;

    /// The entity's stable identifier.
    fn id(&self) -> EntityId;

    /// A short human-readable label, carried in change-event payloads.
    fn display_name(&self) -> &str;
}

/// A recurring habit the user is tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: EntityId,
    pub name: String,
    /// Target completions per week.
    pub frequency: u32,
    /// Current completion streak in days.
    pub streak: u32,
}

impl Habit {
    /// Creates a new habit with a fresh id and no streak.
    #[must_use]
    pub fn new(name: impl Into<String>, frequency: u32) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            frequency,
            streak: 0,
        }
    }
}

impl DomainEntity for Habit {
    const DOMAIN: Domain = Domain::Habit;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A single financial transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: EntityId,
    pub description: String,
    /// Signed amount in the user's currency; negative for spending.
    pub amount: f64,
    pub category: String,
    pub occurred_at: Timestamp,
}

impl FinancialTransaction {
    /// Creates a new transaction stamped at the current time.
    #[must_use]
    pub fn new(description: impl Into<String>, amount: f64, category: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            description: description.into(),
            amount,
            category: category.into(),
            occurred_at: Timestamp::now(),
        }
    }
}

impl DomainEntity for FinancialTransaction {
    const DOMAIN: Domain = Domain::Financial;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.description
    }
}

/// A planner task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerTask {
    pub id: EntityId,
    pub title: String,
    pub due: Option<Timestamp>,
    pub completed: bool,
}

impl PlannerTask {
    /// Creates a new open task.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            due: None,
            completed: false,
        }
    }

    /// Sets a due date.
    #[must_use]
    pub fn with_due(mut self, due: Timestamp) -> Self {
        self.due = Some(due);
        self
    }
}

impl DomainEntity for PlannerTask {
    const DOMAIN: Domain = Domain::Planner;

    fn id(&self) -> EntityId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}
