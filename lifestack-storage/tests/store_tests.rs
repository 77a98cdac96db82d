use lifestack_storage::{mock::FailingStore, KeyValueStore, MemoryStore, SqliteStore};

async fn exercise_roundtrip(store: &dyn KeyValueStore) {
    assert_eq!(store.get("checkpoint/habit-state").await.unwrap(), None);

    store
        .set("checkpoint/habit-state", r#"{"last_synchronized":1}"#)
        .await
        .unwrap();
    assert_eq!(
        store.get("checkpoint/habit-state").await.unwrap().as_deref(),
        Some(r#"{"last_synchronized":1}"#)
    );

    // Overwrite replaces, not appends.
    store
        .set("checkpoint/habit-state", r#"{"last_synchronized":2}"#)
        .await
        .unwrap();
    assert_eq!(
        store.get("checkpoint/habit-state").await.unwrap().as_deref(),
        Some(r#"{"last_synchronized":2}"#)
    );

    store.remove("checkpoint/habit-state").await.unwrap();
    assert_eq!(store.get("checkpoint/habit-state").await.unwrap(), None);
}

// ── MemoryStore ──────────────────────────────────────────────────

#[tokio::test]
async fn memory_store_roundtrip() {
    let store = MemoryStore::new();
    exercise_roundtrip(&store).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn memory_store_remove_missing_key_is_ok() {
    let store = MemoryStore::new();
    store.remove("nope").await.unwrap();
}

#[tokio::test]
async fn memory_store_keys_are_independent() {
    let store = MemoryStore::new();
    store.set("checkpoint/habit-state", "a").await.unwrap();
    store.set("checkpoint/planner-state", "b").await.unwrap();

    store.remove("checkpoint/habit-state").await.unwrap();
    assert_eq!(
        store.get("checkpoint/planner-state").await.unwrap().as_deref(),
        Some("b")
    );
}

// ── SqliteStore ──────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_store_roundtrip_in_memory() {
    let store = SqliteStore::open_in_memory().unwrap();
    exercise_roundtrip(&store).await;
}

#[tokio::test]
async fn sqlite_store_remove_missing_key_is_ok() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.remove("nope").await.unwrap();
}

#[tokio::test]
async fn sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoints.db");

    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .set("checkpoint/financial-state", r#"{"entity_ids":[]}"#)
            .await
            .unwrap();
    }

    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(
        reopened
            .get("checkpoint/financial-state")
            .await
            .unwrap()
            .as_deref(),
        Some(r#"{"entity_ids":[]}"#)
    );
}

#[tokio::test]
async fn sqlite_store_values_can_hold_json() {
    let store = SqliteStore::open_in_memory().unwrap();
    let json = r#"{"last_synchronized":1700000000000,"entity_ids":["a","b"]}"#;
    store.set("checkpoint/planner-state", json).await.unwrap();
    assert_eq!(
        store.get("checkpoint/planner-state").await.unwrap().as_deref(),
        Some(json)
    );
}

// ── FailingStore ─────────────────────────────────────────────────

#[tokio::test]
async fn failing_store_passes_through_when_healthy() {
    let store = FailingStore::new();
    store.set("k", "v").await.unwrap();
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn failing_store_fails_every_operation_when_tripped() {
    let store = FailingStore::new();
    store.set("k", "v").await.unwrap();

    store.set_failing(true);
    assert!(store.set("k", "v2").await.is_err());
    assert!(store.get("k").await.is_err());
    assert!(store.remove("k").await.is_err());

    // Recovers once the failure is cleared; earlier data intact.
    store.set_failing(false);
    assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
}
