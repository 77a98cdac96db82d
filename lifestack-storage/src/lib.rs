//! Durable key-value checkpoint store for the LifeStack state layer.
//!
//! State managers persist only small checkpoint metadata (a sync timestamp
//! plus a list of known entity ids) — never bulk entity content, which is
//! rehydrated from the domain services. A plain key-value contract is
//! therefore enough, and keys are partitioned by manager id so no two
//! managers ever contend for the same key.
//!
//! Two backends are provided:
//! - [`SqliteStore`] — the durable backend, a single-table SQLite database
//! - [`MemoryStore`] — an ephemeral backend for tests and previews

mod error;
mod memory;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

/// A durable string-keyed store for checkpoint metadata.
///
/// Values are opaque to the store; the state layer writes JSON documents.
/// All operations may fail with a [`StorageError`], which callers surface
/// as a persistence failure (or swallow during best-effort cleanup).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Removes the value stored under `key`. Removing a missing key is not
    /// an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Test doubles for the storage layer.
pub mod mock {
    use super::{KeyValueStore, MemoryStore, StorageError, StorageResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// A store that can be switched into a failing mode, for exercising
    /// persistence-failure paths.
    #[derive(Default)]
    pub struct FailingStore {
        inner: MemoryStore,
        failing: AtomicBool,
    }

    impl FailingStore {
        /// Creates a new store in working mode.
        pub fn new() -> Self {
            Self::default()
        }

        /// Switches the store between working and failing mode.
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self) -> StorageResult<()> {
            if self.failing.load(Ordering::SeqCst) {
                Err(StorageError::Unavailable("injected failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.check()?;
            self.inner.set(key, value).await
        }

        async fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.check()?;
            self.inner.get(key).await
        }

        async fn remove(&self, key: &str) -> StorageResult<()> {
            self.check()?;
            self.inner.remove(key).await
        }
    }
}
