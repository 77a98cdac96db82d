//! Multi-domain state synchronization for LifeStack.
//!
//! Each bounded domain (habits, finances, planner) gets a [`StateManager`]
//! that caches its entities, delegates mutation to an injected domain
//! service, queues outgoing [`ChangeEvent`]s, and persists a lightweight
//! checkpoint. A single [`GlobalStateCoordinator`] owns the managers,
//! drives their lifecycle, and periodically fans pending events out to
//! every manager except the one that produced them.
//!
//! # Architecture
//!
//! - **Manager**: per-domain cache + event queue + health + checkpoint
//! - **Coordinator**: lifecycle, periodic reconciliation, fan-out, health
//!   aggregation
//! - **Collaborators**: a domain service per domain (the real business
//!   logic), a key-value store for checkpoints, and a fire-and-forget
//!   observability sink
//!
//! # Example
//!
//! ```
//! use lifestack_model::mock::MockDomainService;
//! use lifestack_model::{FinancialTransaction, Habit, PlannerTask};
//! use lifestack_state::{create_coordinator, CoordinatorConfig, NullSink};
//! use lifestack_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), lifestack_state::StateError> {
//! let (coordinator, managers) = create_coordinator(
//!     Arc::new(MockDomainService::<Habit>::new()),
//!     Arc::new(MockDomainService::<FinancialTransaction>::new()),
//!     Arc::new(MockDomainService::<PlannerTask>::new()),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(NullSink::new()),
//!     CoordinatorConfig::default(),
//! );
//!
//! coordinator.initialize().await?;
//! let habit = managers.habits.create(Habit::new("Run", 3)).await?;
//! coordinator.sync_all().await?;
//! assert!(managers.habits.get(habit.id).await.is_some());
//! coordinator.cleanup().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod coordinator;
mod error;
mod manager;
mod observer;

pub use config::{CoordinatorConfig, ManagerConfig};
pub use coordinator::{CoordinatorPhase, GlobalStateCoordinator};
pub use error::{StateError, StateResult};
pub use manager::{Checkpoint, ManagedState, StateManager};
pub use observer::{mock, NullSink, ObservabilitySink, TracingSink};

use lifestack_model::{DomainService, FinancialTransaction, Habit, PlannerTask};
use lifestack_storage::KeyValueStore;
use std::sync::Arc;

/// Typed handles to the three default domain managers, for callers that
/// need entity snapshots and per-domain operations. The coordinator holds
/// the same managers behind the object-safe [`ManagedState`] view.
pub struct DomainManagers {
    /// The habit domain manager.
    pub habits: Arc<StateManager<Habit>>,
    /// The financial domain manager.
    pub finances: Arc<StateManager<FinancialTransaction>>,
    /// The planner domain manager.
    pub planner: Arc<StateManager<PlannerTask>>,
}

/// Assembles the three default domain managers and a coordinator over
/// them, in the fixed domain order (habit, financial, planner).
pub fn create_coordinator(
    habit_service: Arc<dyn DomainService<Habit>>,
    financial_service: Arc<dyn DomainService<FinancialTransaction>>,
    planner_service: Arc<dyn DomainService<PlannerTask>>,
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ObservabilitySink>,
    config: CoordinatorConfig,
) -> (GlobalStateCoordinator, DomainManagers) {
    let habits = Arc::new(StateManager::new(
        habit_service,
        store.clone(),
        sink.clone(),
        config.manager.clone(),
    ));
    let finances = Arc::new(StateManager::new(
        financial_service,
        store.clone(),
        sink.clone(),
        config.manager.clone(),
    ));
    let planner = Arc::new(StateManager::new(
        planner_service,
        store,
        sink.clone(),
        config.manager.clone(),
    ));

    let managed: Vec<Arc<dyn ManagedState>> =
        vec![habits.clone(), finances.clone(), planner.clone()];
    let coordinator = GlobalStateCoordinator::new(managed, config, sink);

    (
        coordinator,
        DomainManagers {
            habits,
            finances,
            planner,
        },
    )
}
