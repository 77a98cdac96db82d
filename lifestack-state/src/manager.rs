//! Per-domain state manager.
//!
//! A `StateManager` caches one domain's entities locally, delegates every
//! mutation to the injected domain service, queues outgoing change events
//! for cross-domain fan-out, tracks its own health, and persists a small
//! checkpoint (sync timestamp + known entity ids) to the key-value store.
//!
//! Concurrency model: service-backed operations are serialized by an
//! operation gate, so at most one mutation is in flight per manager.
//! Snapshot reads take only the short state lock and are served even while
//! a mutation is suspended on the service — and even while the manager is
//! in `Error` health (stale-but-available).

use crate::config::ManagerConfig;
use crate::error::{StateError, StateResult};
use crate::observer::ObservabilitySink;
use async_trait::async_trait;
use lifestack_model::{DomainEntity, DomainService};
use lifestack_storage::{KeyValueStore, StorageError};
use lifestack_types::{ChangeEvent, ChangeKind, Domain, EntityId, HealthStatus, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// The small persisted record a manager restores on `load_state`.
///
/// Entity content is never checkpointed; it is rehydrated from the domain
/// service on initialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// When the manager last completed a successful sync.
    pub last_synchronized: Option<Timestamp>,
    /// Ids of the entities the manager knew about at checkpoint time.
    pub entity_ids: Vec<EntityId>,
}

#[derive(Debug)]
struct ManagerState<E> {
    entities: HashMap<EntityId, E>,
    /// Per-entity derived data (insights, streaks) fetched from the service.
    derived: HashMap<EntityId, serde_json::Value>,
    /// Display labels for entities owned by *other* domains that this
    /// domain links to. Cleared when their owning domain deletes them.
    references: HashMap<EntityId, String>,
    loading: bool,
    last_error: Option<String>,
    last_synchronized: Option<Timestamp>,
    pending: VecDeque<ChangeEvent>,
}

impl<E> Default for ManagerState<E> {
    fn default() -> Self {
        Self {
            entities: HashMap::new(),
            derived: HashMap::new(),
            references: HashMap::new(),
            loading: false,
            last_error: None,
            last_synchronized: None,
            pending: VecDeque::new(),
        }
    }
}

/// State manager for one domain.
pub struct StateManager<E: DomainEntity> {
    domain: Domain,
    manager_id: String,
    config: ManagerConfig,
    service: Arc<dyn DomainService<E>>,
    store: Arc<dyn KeyValueStore>,
    sink: Arc<dyn ObservabilitySink>,
    /// Serializes service-backed operations: at most one in flight.
    op_gate: Mutex<()>,
    state: RwLock<ManagerState<E>>,
}

impl<E: DomainEntity> StateManager<E> {
    /// Creates a manager for the entity type's domain.
    pub fn new(
        service: Arc<dyn DomainService<E>>,
        store: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ObservabilitySink>,
        config: ManagerConfig,
    ) -> Self {
        let domain = E::DOMAIN;
        Self {
            domain,
            manager_id: format!("{}-state", domain.as_str()),
            config,
            service,
            store,
            sink,
            op_gate: Mutex::new(()),
            state: RwLock::new(ManagerState::default()),
        }
    }

    /// The manager's domain.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The manager's stable id, used as the fan-out origin tag and the
    /// checkpoint key prefix.
    pub fn manager_id(&self) -> &str {
        &self.manager_id
    }

    fn checkpoint_key(&self) -> String {
        format!("checkpoint/{}", self.manager_id)
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Restores the persisted checkpoint, then rehydrates the entity cache
    /// from the domain service. Any failure is recorded as the manager's
    /// last error and propagated.
    pub async fn initialize(&self) -> StateResult<()> {
        let _op = self.op_gate.lock().await;
        self.set_loading(true).await;

        let result = self.initialize_inner().await;
        let mut state = self.state.write().await;
        match &result {
            Ok(()) => {
                state.last_error = None;
                info!(
                    manager = %self.manager_id,
                    entities = state.entities.len(),
                    "initialized"
                );
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                warn!(manager = %self.manager_id, error = %e, "initialization failed");
            }
        }
        state.loading = false;
        drop(state);

        match result {
            Ok(()) => {
                self.sink.track(
                    "state_initialized",
                    &[("domain", self.domain.to_string())],
                    self.config.user_id.as_deref(),
                );
                Ok(())
            }
            Err(e) => {
                self.sink.track_error(&e, "initialize");
                Err(e)
            }
        }
    }

    async fn initialize_inner(&self) -> StateResult<()> {
        self.load_state().await?;
        let entities = self
            .service
            .fetch_all()
            .await
            .map_err(StateError::Service)?;
        let mut state = self.state.write().await;
        state.entities = entities.into_iter().map(|e| (e.id(), e)).collect();
        Ok(())
    }

    /// Clears all local state: entity cache, derived data, references,
    /// the pending queue, the last error, and the sync timestamp. Never
    /// fails; performs no I/O.
    pub async fn reset(&self) {
        let _op = self.op_gate.lock().await;
        {
            let mut state = self.state.write().await;
            state.entities.clear();
            state.derived.clear();
            state.references.clear();
            state.pending.clear();
            state.last_error = None;
            state.last_synchronized = None;
        }
        self.sink.track(
            "state_reset",
            &[("domain", self.domain.to_string())],
            self.config.user_id.as_deref(),
        );
        info!(manager = %self.manager_id, "state reset");
    }

    /// Persists a final checkpoint. Best-effort: a persistence failure is
    /// observed but never re-thrown, so shutdown is never blocked.
    pub async fn cleanup(&self) {
        let _op = self.op_gate.lock().await;
        if let Err(e) = self.save_state_inner().await {
            warn!(manager = %self.manager_id, error = %e, "cleanup persistence failed");
            self.sink.track_error(&e, "cleanup");
        }
        debug!(manager = %self.manager_id, "cleaned up");
    }

    // ── Health ───────────────────────────────────────────────────

    /// Derives the manager's health from its last error and the age of its
    /// last successful sync.
    pub async fn state_health(&self) -> HealthStatus {
        let state = self.state.read().await;
        if let Some(error) = &state.last_error {
            return HealthStatus::Error(error.clone());
        }
        match state.last_synchronized {
            None => HealthStatus::Warning("never synchronized".to_string()),
            Some(ts) if ts.is_older_than(self.config.staleness_threshold) => {
                HealthStatus::Warning(format!(
                    "last sync {}s ago",
                    ts.elapsed().as_secs()
                ))
            }
            Some(_) => HealthStatus::Healthy,
        }
    }

    // ── Domain CRUD ──────────────────────────────────────────────

    /// Creates an entity via the domain service. On success the returned
    /// entity is cached, a `Create` event is queued, and the checkpoint is
    /// saved. On service failure nothing is mutated and the error is both
    /// recorded and re-thrown.
    pub async fn create(&self, entity: E) -> StateResult<E> {
        let _op = self.op_gate.lock().await;
        self.set_loading(true).await;

        match self.service.create(entity).await {
            Ok(created) => {
                let id = created.id();
                let name = created.display_name().to_string();
                {
                    let mut state = self.state.write().await;
                    state.entities.insert(id, created.clone());
                    state.pending.push_back(ChangeEvent::created(
                        self.domain,
                        self.manager_id.as_str(),
                        id,
                        name.clone(),
                        self.config.user_id.clone(),
                    ));
                    state.last_error = None;
                    state.loading = false;
                }
                self.save_after_mutation("create").await?;
                self.sink.track(
                    "entity_created",
                    &[
                        ("domain", self.domain.to_string()),
                        ("entity_id", id.to_string()),
                    ],
                    self.config.user_id.as_deref(),
                );
                debug!(manager = %self.manager_id, entity = %id, name = %name, "created");
                Ok(created)
            }
            Err(e) => Err(self.fail_operation(e, "create").await),
        }
    }

    /// Replaces an existing entity via the domain service. Mirrors
    /// [`Self::create`] with an `Update` event.
    pub async fn update(&self, entity: E) -> StateResult<E> {
        let _op = self.op_gate.lock().await;
        self.set_loading(true).await;

        match self.service.update(entity).await {
            Ok(updated) => {
                let id = updated.id();
                let name = updated.display_name().to_string();
                {
                    let mut state = self.state.write().await;
                    state.entities.insert(id, updated.clone());
                    state.pending.push_back(ChangeEvent::updated(
                        self.domain,
                        self.manager_id.as_str(),
                        id,
                        name,
                        self.config.user_id.clone(),
                    ));
                    state.last_error = None;
                    state.loading = false;
                }
                self.save_after_mutation("update").await?;
                debug!(manager = %self.manager_id, entity = %id, "updated");
                Ok(updated)
            }
            Err(e) => Err(self.fail_operation(e, "update").await),
        }
    }

    /// Deletes an entity via the domain service. On success the primary
    /// entry is removed along with any derived/reference data keyed by the
    /// same id, and a `Delete` event carrying the id is queued.
    pub async fn delete(&self, id: EntityId) -> StateResult<()> {
        let _op = self.op_gate.lock().await;
        self.set_loading(true).await;

        match self.service.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.state.write().await;
                    let removed = state.entities.remove(&id);
                    state.derived.remove(&id);
                    state.references.remove(&id);
                    let name = removed.map(|e| e.display_name().to_string());
                    state.pending.push_back(ChangeEvent::deleted(
                        self.domain,
                        self.manager_id.as_str(),
                        id,
                        name,
                        self.config.user_id.clone(),
                    ));
                    state.last_error = None;
                    state.loading = false;
                }
                self.save_after_mutation("delete").await?;
                debug!(manager = %self.manager_id, entity = %id, "deleted");
                Ok(())
            }
            Err(e) => Err(self.fail_operation(e, "delete").await),
        }
    }

    /// Fetches the domain-specific insight for an entity and caches it in
    /// the derived map.
    pub async fn insight(&self, id: EntityId) -> StateResult<serde_json::Value> {
        let _op = self.op_gate.lock().await;
        self.set_loading(true).await;

        match self.service.insight(id).await {
            Ok(value) => {
                let mut state = self.state.write().await;
                state.derived.insert(id, value.clone());
                state.last_error = None;
                state.loading = false;
                Ok(value)
            }
            Err(e) => Err(self.fail_operation(e, "insight").await),
        }
    }

    // ── Snapshot reads ───────────────────────────────────────────

    /// Returns the cached entity with the given id, if any.
    pub async fn get(&self, id: EntityId) -> Option<E> {
        self.state.read().await.entities.get(&id).cloned()
    }

    /// Returns a snapshot of all cached entities.
    pub async fn entities(&self) -> Vec<E> {
        self.state.read().await.entities.values().cloned().collect()
    }

    /// Returns the cached insight for an entity, if one has been fetched.
    pub async fn cached_insight(&self, id: EntityId) -> Option<serde_json::Value> {
        self.state.read().await.derived.get(&id).cloned()
    }

    /// Records a display label for an entity owned by another domain.
    pub async fn cache_reference(&self, id: EntityId, label: impl Into<String>) {
        self.state.write().await.references.insert(id, label.into());
    }

    /// Returns the cached cross-domain reference label, if any.
    pub async fn reference(&self, id: EntityId) -> Option<String> {
        self.state.read().await.references.get(&id).cloned()
    }

    /// Whether an operation is currently in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The last recorded error message, if any.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// When the manager last completed a successful sync.
    pub async fn last_synchronized(&self) -> Option<Timestamp> {
        self.state.read().await.last_synchronized
    }

    // ── Change distribution ──────────────────────────────────────

    /// Returns and clears the pending event queue in one atomic pass.
    /// Drain-once: the caller owns the returned events; nothing is ever
    /// re-delivered.
    pub async fn take_pending_changes(&self) -> Vec<ChangeEvent> {
        let mut state = self.state.write().await;
        state.pending.drain(..).collect()
    }

    /// Reacts to an event that originated in another manager. Events whose
    /// `source_manager` matches this manager are ignored outright.
    ///
    /// `Create`/`Update` only produce an observability signal — this layer
    /// never materializes another domain's entities. `Delete` drops any
    /// derived/reference data cached under the carried id. `Sync`/`Reset`
    /// are no-ops.
    pub async fn handle_external_change(&self, event: &ChangeEvent) {
        if event.source_manager == self.manager_id {
            return;
        }
        match event.kind {
            ChangeKind::Create | ChangeKind::Update => {
                self.sink.track(
                    "external_change_observed",
                    &[
                        ("domain", event.domain.to_string()),
                        ("kind", event.kind.to_string()),
                    ],
                    event.user_id.as_deref(),
                );
                debug!(
                    manager = %self.manager_id,
                    source = %event.source_manager,
                    kind = %event.kind,
                    "observed external change"
                );
            }
            ChangeKind::Delete => {
                let Some(id) = event.entity_id() else {
                    warn!(
                        manager = %self.manager_id,
                        event = %event.id,
                        "delete event carried no entity id"
                    );
                    return;
                };
                let mut state = self.state.write().await;
                let dropped_derived = state.derived.remove(&id).is_some();
                let dropped_reference = state.references.remove(&id).is_some();
                drop(state);
                if dropped_derived || dropped_reference {
                    debug!(
                        manager = %self.manager_id,
                        entity = %id,
                        "dropped cached data for externally deleted entity"
                    );
                }
            }
            ChangeKind::Sync | ChangeKind::Reset => {}
        }
    }

    /// Records a completed sync pass: stamps the sync timestamp, clears any
    /// recorded error, and persists the checkpoint.
    pub async fn sync_state(&self, domains: &[Domain]) -> StateResult<()> {
        {
            let mut state = self.state.write().await;
            state.last_synchronized = Some(Timestamp::now());
            state.last_error = None;
        }
        self.save_state_inner().await?;
        self.sink.track(
            "state_synchronized",
            &[
                ("domain", self.domain.to_string()),
                ("participants", domains.len().to_string()),
            ],
            self.config.user_id.as_deref(),
        );
        debug!(manager = %self.manager_id, "synchronized");
        Ok(())
    }

    // ── Checkpoint persistence ───────────────────────────────────

    /// Persists the checkpoint (sync timestamp + known entity ids).
    pub async fn save_state(&self) -> StateResult<()> {
        self.save_state_inner().await
    }

    async fn save_state_inner(&self) -> StateResult<()> {
        let checkpoint = {
            let state = self.state.read().await;
            let mut entity_ids: Vec<EntityId> = state.entities.keys().copied().collect();
            entity_ids.sort();
            Checkpoint {
                last_synchronized: state.last_synchronized,
                entity_ids,
            }
        };
        let json = serde_json::to_string(&checkpoint)
            .map_err(|e| StateError::Persistence(StorageError::from(e)))?;
        self.store
            .set(&self.checkpoint_key(), &json)
            .await
            .map_err(StateError::Persistence)?;
        Ok(())
    }

    /// Restores the checkpoint, if one is persisted. Only the sync
    /// timestamp feeds back into live state; the id list is informational.
    pub async fn load_state(&self) -> StateResult<()> {
        let raw = self
            .store
            .get(&self.checkpoint_key())
            .await
            .map_err(StateError::Persistence)?;
        match raw {
            Some(raw) => {
                let checkpoint: Checkpoint = serde_json::from_str(&raw)
                    .map_err(|e| StateError::Persistence(StorageError::from(e)))?;
                let mut state = self.state.write().await;
                state.last_synchronized = checkpoint.last_synchronized;
                debug!(
                    manager = %self.manager_id,
                    known = checkpoint.entity_ids.len(),
                    "restored checkpoint"
                );
            }
            None => {
                debug!(manager = %self.manager_id, "no checkpoint to restore");
            }
        }
        Ok(())
    }

    /// Removes the persisted checkpoint.
    pub async fn clear_persisted_state(&self) -> StateResult<()> {
        self.store
            .remove(&self.checkpoint_key())
            .await
            .map_err(StateError::Persistence)
    }

    // ── Internals ────────────────────────────────────────────────

    async fn set_loading(&self, loading: bool) {
        self.state.write().await.loading = loading;
    }

    /// Records a service failure: sets the last error, drops the loading
    /// flag, reports to the sink, and returns the error to re-throw.
    async fn fail_operation(
        &self,
        error: lifestack_model::ServiceError,
        context: &str,
    ) -> StateError {
        {
            let mut state = self.state.write().await;
            state.last_error = Some(error.to_string());
            state.loading = false;
        }
        let error = StateError::Service(error);
        self.sink.track_error(&error, context);
        warn!(manager = %self.manager_id, context, error = %error, "operation failed");
        error
    }

    /// Persists the checkpoint after a committed mutation. The mutation
    /// itself is already applied; a failing save surfaces as a persistence
    /// error and is recorded as the manager's last error.
    async fn save_after_mutation(&self, context: &str) -> StateResult<()> {
        if let Err(e) = self.save_state_inner().await {
            self.state.write().await.last_error = Some(e.to_string());
            self.sink.track_error(&e, context);
            return Err(e);
        }
        Ok(())
    }
}

/// Object-safe view of a state manager, used by the coordinator to drive
/// heterogeneous managers through one lifecycle.
#[async_trait]
pub trait ManagedState: Send + Sync {
    /// The manager's domain.
    fn domain(&self) -> Domain;

    /// The manager's stable id.
    fn manager_id(&self) -> &str;

    /// See [`StateManager::initialize`].
    async fn initialize(&self) -> StateResult<()>;

    /// See [`StateManager::reset`].
    async fn reset(&self);

    /// See [`StateManager::cleanup`].
    async fn cleanup(&self);

    /// See [`StateManager::sync_state`].
    async fn sync_state(&self, domains: &[Domain]) -> StateResult<()>;

    /// See [`StateManager::take_pending_changes`].
    async fn take_pending_changes(&self) -> Vec<ChangeEvent>;

    /// See [`StateManager::handle_external_change`]. Fallible at the trait
    /// level so specialized managers can surface fan-out failures.
    async fn handle_external_change(&self, event: &ChangeEvent) -> StateResult<()>;

    /// See [`StateManager::state_health`].
    async fn state_health(&self) -> HealthStatus;
}

#[async_trait]
impl<E: DomainEntity> ManagedState for StateManager<E> {
    fn domain(&self) -> Domain {
        StateManager::domain(self)
    }

    fn manager_id(&self) -> &str {
        StateManager::manager_id(self)
    }

    async fn initialize(&self) -> StateResult<()> {
        StateManager::initialize(self).await
    }

    async fn reset(&self) {
        StateManager::reset(self).await;
    }

    async fn cleanup(&self) {
        StateManager::cleanup(self).await;
    }

    async fn sync_state(&self, domains: &[Domain]) -> StateResult<()> {
        StateManager::sync_state(self, domains).await
    }

    async fn take_pending_changes(&self) -> Vec<ChangeEvent> {
        StateManager::take_pending_changes(self).await
    }

    async fn handle_external_change(&self, event: &ChangeEvent) -> StateResult<()> {
        StateManager::handle_external_change(self, event).await;
        Ok(())
    }

    async fn state_health(&self) -> HealthStatus {
        StateManager::state_health(self).await
    }
}
