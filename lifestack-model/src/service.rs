//! The injected domain-service contract.
//!
//! One service per domain performs the real business work (validation,
//! persistence of entity content, derived metrics). The state layer calls
//! it through this trait and treats every operation as an opaque async call
//! that may fail.

use crate::entity::DomainEntity;
use async_trait::async_trait;
use lifestack_types::EntityId;
use thiserror::Error;

/// Result type for domain-service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors a domain service can surface. The state layer propagates these
/// verbatim to its caller; it never retries.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The operation was rejected by domain validation.
    #[error("operation rejected: {0}")]
    Rejected(String),

    /// The entity does not exist in the service's backing store.
    #[error("entity not found: {0}")]
    NotFound(EntityId),

    /// The service's backend is unreachable or failed.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Async operations a domain service must expose to its state manager.
///
/// `fetch_all` is the rehydration path: the state layer persists no entity
/// content of its own, so the cached map is rebuilt from here on
/// initialization.
#[async_trait]
pub trait DomainService<E: DomainEntity>: Send + Sync {
    /// Creates an entity, returning the stored representation.
    async fn create(&self, entity: E) -> ServiceResult<E>;

    /// Replaces an existing entity, returning the stored representation.
    async fn update(&self, entity: E) -> ServiceResult<E>;

    /// Deletes an entity by id.
    async fn delete(&self, id: EntityId) -> ServiceResult<()>;

    /// Returns every entity the service currently holds.
    async fn fetch_all(&self) -> ServiceResult<Vec<E>>;

    /// Domain-specific derived read (insights, streaks, recommendations)
    /// for one entity, as an opaque JSON document.
    async fn insight(&self, id: EntityId) -> ServiceResult<serde_json::Value>;
}

/// Test doubles for the service contract.
pub mod mock {
    use super::{DomainService, ServiceError, ServiceResult};
    use crate::entity::DomainEntity;
    use async_trait::async_trait;
    use lifestack_types::EntityId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// An in-memory domain service with injectable failure.
    ///
    /// While a failure message is set, every operation fails with
    /// [`ServiceError::Unavailable`] and mutates nothing.
    pub struct MockDomainService<E> {
        entities: Mutex<HashMap<EntityId, E>>,
        fail_with: Mutex<Option<String>>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl<E: DomainEntity> MockDomainService<E> {
        /// Creates an empty service.
        pub fn new() -> Self {
            Self {
                entities: Mutex::new(HashMap::new()),
                fail_with: Mutex::new(None),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Creates a service pre-seeded with entities.
        pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
            let service = Self::new();
            {
                let mut map = service.entities.lock().unwrap();
                for entity in entities {
                    map.insert(entity.id(), entity);
                }
            }
            service
        }

        /// Makes every subsequent operation fail with the given message,
        /// until cleared with [`Self::succeed`].
        pub fn fail_with(&self, message: impl Into<String>) {
            *self.fail_with.lock().unwrap() = Some(message.into());
        }

        /// Clears an injected failure.
        pub fn succeed(&self) {
            *self.fail_with.lock().unwrap() = None;
        }

        /// The operation names invoked so far, in order.
        pub fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        /// Number of entities currently held.
        pub fn len(&self) -> usize {
            self.entities.lock().unwrap().len()
        }

        /// Returns true if the service holds no entities.
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn record(&self, op: &'static str) -> ServiceResult<()> {
            self.calls.lock().unwrap().push(op);
            match self.fail_with.lock().unwrap().as_ref() {
                Some(message) => Err(ServiceError::Unavailable(message.clone())),
                None => Ok(()),
            }
        }
    }

    impl<E: DomainEntity> Default for MockDomainService<E> {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl<E: DomainEntity> DomainService<E> for MockDomainService<E> {
        async fn create(&self, entity: E) -> ServiceResult<E> {
            self.record("create")?;
            self.entities
                .lock()
                .unwrap()
                .insert(entity.id(), entity.clone());
            Ok(entity)
        }

        async fn update(&self, entity: E) -> ServiceResult<E> {
            self.record("update")?;
            let mut map = self.entities.lock().unwrap();
            if !map.contains_key(&entity.id()) {
                return Err(ServiceError::NotFound(entity.id()));
            }
            map.insert(entity.id(), entity.clone());
            Ok(entity)
        }

        async fn delete(&self, id: EntityId) -> ServiceResult<()> {
            self.record("delete")?;
            match self.entities.lock().unwrap().remove(&id) {
                Some(_) => Ok(()),
                None => Err(ServiceError::NotFound(id)),
            }
        }

        async fn fetch_all(&self) -> ServiceResult<Vec<E>> {
            self.record("fetch_all")?;
            Ok(self.entities.lock().unwrap().values().cloned().collect())
        }

        async fn insight(&self, id: EntityId) -> ServiceResult<serde_json::Value> {
            self.record("insight")?;
            if !self.entities.lock().unwrap().contains_key(&id) {
                return Err(ServiceError::NotFound(id));
            }
            Ok(serde_json::json!({ "entity_id": id.to_string(), "score": 1.0 }))
        }
    }
}
