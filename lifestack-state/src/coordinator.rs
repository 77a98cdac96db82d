//! Global state coordinator.
//!
//! Owns one state manager per domain, drives their lifecycle in a fixed
//! deterministic order, and runs the cross-domain reconciliation pass:
//! drain every manager's pending queue once, then fan each event out to
//! every manager except its origin.
//!
//! The coordinator is an explicitly constructed, passed-down handle —
//! there is no process-wide singleton. Construct it once at application
//! start; clones share the same underlying state.

use crate::config::CoordinatorConfig;
use crate::error::{StateError, StateResult};
use crate::manager::ManagedState;
use crate::observer::ObservabilitySink;
use lifestack_types::{Domain, HealthStatus, Timestamp};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle phase of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// Constructed but not yet initialized, or cleaned up.
    Uninitialized,
    /// `initialize` is in progress.
    Initializing,
    /// Ready; the periodic sync task is running.
    Initialized,
    /// `cleanup` is in progress.
    CleaningUp,
}

struct PeriodicSync {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

struct Inner {
    managers: Vec<Arc<dyn ManagedState>>,
    config: CoordinatorConfig,
    sink: Arc<dyn ObservabilitySink>,
    phase: RwLock<CoordinatorPhase>,
    global_error: RwLock<Option<String>>,
    last_global_sync: RwLock<Option<Timestamp>>,
    /// Single-flight gate: foreground callers and the timer never run a
    /// sync pass concurrently, so no manager's queue can be double-drained.
    sync_gate: Mutex<()>,
    periodic: Mutex<Option<PeriodicSync>>,
}

/// Coordinates the per-domain state managers. Cheap to clone; all clones
/// share the same managers, lifecycle state, and periodic sync task.
#[derive(Clone)]
pub struct GlobalStateCoordinator {
    inner: Arc<Inner>,
}

impl GlobalStateCoordinator {
    /// Creates a coordinator over the given managers. The manager order is
    /// preserved and used for every lifecycle and fan-out iteration.
    pub fn new(
        managers: Vec<Arc<dyn ManagedState>>,
        config: CoordinatorConfig,
        sink: Arc<dyn ObservabilitySink>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                managers,
                config,
                sink,
                phase: RwLock::new(CoordinatorPhase::Uninitialized),
                global_error: RwLock::new(None),
                last_global_sync: RwLock::new(None),
                sync_gate: Mutex::new(()),
                periodic: Mutex::new(None),
            }),
        }
    }

    /// The managers under coordination, in iteration order.
    pub fn managers(&self) -> &[Arc<dyn ManagedState>] {
        &self.inner.managers
    }

    /// The current lifecycle phase.
    pub async fn phase(&self) -> CoordinatorPhase {
        *self.inner.phase.read().await
    }

    /// Whether the coordinator is initialized and running.
    pub async fn is_initialized(&self) -> bool {
        *self.inner.phase.read().await == CoordinatorPhase::Initialized
    }

    /// The last recorded global error message, if any.
    pub async fn global_error(&self) -> Option<String> {
        self.inner.global_error.read().await.clone()
    }

    /// When the last global sync pass completed.
    pub async fn last_global_sync(&self) -> Option<Timestamp> {
        *self.inner.last_global_sync.read().await
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Initializes every manager in fixed order, fail-fast: the first
    /// failure is recorded and re-thrown without touching the remaining
    /// managers. On success the periodic sync task is started.
    ///
    /// Calling `initialize` when already initialized is an idempotent
    /// no-op; calling it while another initialization or a cleanup is in
    /// progress is an `InvalidState` error.
    pub async fn initialize(&self) -> StateResult<()> {
        {
            let mut phase = self.inner.phase.write().await;
            match *phase {
                CoordinatorPhase::Initialized => {
                    debug!("already initialized");
                    return Ok(());
                }
                CoordinatorPhase::Initializing => {
                    return Err(StateError::InvalidState(
                        "initialization already in progress".to_string(),
                    ));
                }
                CoordinatorPhase::CleaningUp => {
                    return Err(StateError::InvalidState(
                        "cleanup in progress".to_string(),
                    ));
                }
                CoordinatorPhase::Uninitialized => {
                    *phase = CoordinatorPhase::Initializing;
                }
            }
        }

        for manager in &self.inner.managers {
            if let Err(e) = manager.initialize().await {
                warn!(
                    manager = manager.manager_id(),
                    error = %e,
                    "manager initialization failed"
                );
                *self.inner.phase.write().await = CoordinatorPhase::Uninitialized;
                self.record_global_error(&e).await;
                self.inner.sink.track_error(&e, "coordinator.initialize");
                return Err(e);
            }
        }

        *self.inner.phase.write().await = CoordinatorPhase::Initialized;
        self.start_periodic_sync().await;
        self.inner.sink.track(
            "coordinator_initialized",
            &[("managers", self.inner.managers.len().to_string())],
            None,
        );
        info!(managers = self.inner.managers.len(), "coordinator initialized");
        Ok(())
    }

    /// Stops the periodic sync task (awaiting any in-flight pass), runs
    /// every manager's best-effort cleanup, and returns the coordinator to
    /// `Uninitialized`. Never fails; a no-op unless currently initialized.
    pub async fn cleanup(&self) {
        {
            let mut phase = self.inner.phase.write().await;
            if *phase != CoordinatorPhase::Initialized {
                debug!(?phase, "cleanup skipped");
                return;
            }
            *phase = CoordinatorPhase::CleaningUp;
        }

        if let Some(periodic) = self.inner.periodic.lock().await.take() {
            // An in-flight pass finishes before the task observes shutdown.
            let _ = periodic.shutdown.send(true);
            if let Err(e) = periodic.handle.await {
                warn!(error = %e, "periodic sync task failed to join");
            }
        }

        for manager in &self.inner.managers {
            manager.cleanup().await;
        }

        *self.inner.phase.write().await = CoordinatorPhase::Uninitialized;
        self.inner.sink.track("coordinator_cleanup", &[], None);
        info!("coordinator cleaned up");
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Runs one global reconciliation pass:
    ///
    /// 1. `sync_state` on every manager (stamps their sync timestamps).
    /// 2. Drain every manager's pending queue exactly once, concatenating
    ///    in manager order; within a manager events stay FIFO.
    /// 3. Fan each event out to every manager except the one whose id
    ///    matches the event's `source_manager`.
    /// 4. Stamp the global sync timestamp and clear the global error.
    ///
    /// A manager failure during step 1 or 3 records the global error and
    /// re-throws as [`StateError::PartialSync`]; fan-out already applied to
    /// other managers is not rolled back.
    pub async fn sync_all(&self) -> StateResult<()> {
        if *self.inner.phase.read().await != CoordinatorPhase::Initialized {
            return Err(StateError::InvalidState(
                "coordinator is not initialized".to_string(),
            ));
        }
        let _guard = self.inner.sync_gate.lock().await;
        // Re-check: cleanup may have started while waiting on the gate.
        if *self.inner.phase.read().await != CoordinatorPhase::Initialized {
            return Err(StateError::InvalidState(
                "coordinator is not initialized".to_string(),
            ));
        }

        let domains = Domain::all();
        for manager in &self.inner.managers {
            if let Err(e) = manager.sync_state(&domains).await {
                return Err(self.fail_sync(manager.manager_id(), e).await);
            }
        }

        let mut events = Vec::new();
        for manager in &self.inner.managers {
            events.extend(manager.take_pending_changes().await);
        }
        debug!(events = events.len(), "fanning out pending changes");

        for event in &events {
            for manager in &self.inner.managers {
                if manager.manager_id() == event.source_manager {
                    continue;
                }
                if let Err(e) = manager.handle_external_change(event).await {
                    return Err(self.fail_sync(manager.manager_id(), e).await);
                }
            }
        }

        *self.inner.last_global_sync.write().await = Some(Timestamp::now());
        *self.inner.global_error.write().await = None;
        self.inner.sink.track(
            "global_sync_completed",
            &[("events", events.len().to_string())],
            None,
        );
        Ok(())
    }

    /// Health of every manager, keyed by manager id. Pure aggregation.
    pub async fn global_health(&self) -> BTreeMap<String, HealthStatus> {
        let mut health = BTreeMap::new();
        for manager in &self.inner.managers {
            health.insert(
                manager.manager_id().to_string(),
                manager.state_health().await,
            );
        }
        health
    }

    /// Resets every manager and clears the global error and sync
    /// timestamp. The periodic sync task keeps running.
    pub async fn reset_all(&self) {
        for manager in &self.inner.managers {
            manager.reset().await;
        }
        *self.inner.global_error.write().await = None;
        *self.inner.last_global_sync.write().await = None;
        self.inner.sink.track("coordinator_reset", &[], None);
        info!("all managers reset");
    }

    // ── Internals ────────────────────────────────────────────────

    async fn start_periodic_sync(&self) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let coordinator = self.clone();
        let period = self.inner.config.sync_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; consume it so the first
            // pass runs one full period after initialization.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = coordinator.sync_all().await {
                            // Recorded in the global error; background sync
                            // failures never propagate or kill the task.
                            warn!(error = %e, "periodic sync failed");
                        }
                    }
                }
            }
            debug!("periodic sync task stopped");
        });

        *self.inner.periodic.lock().await = Some(PeriodicSync {
            shutdown: shutdown_tx,
            handle,
        });
        debug!(period = ?period, "periodic sync started");
    }

    async fn fail_sync(&self, manager_id: &str, source: StateError) -> StateError {
        let error = StateError::PartialSync {
            manager: manager_id.to_string(),
            source: Box::new(source),
        };
        self.record_global_error(&error).await;
        self.inner.sink.track_error(&error, "coordinator.sync_all");
        warn!(manager = manager_id, error = %error, "sync pass failed");
        error
    }

    async fn record_global_error(&self, error: &StateError) {
        *self.inner.global_error.write().await = Some(error.to_string());
    }
}
