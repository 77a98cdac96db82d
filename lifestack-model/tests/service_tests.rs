use lifestack_model::mock::MockDomainService;
use lifestack_model::{DomainEntity, DomainService, Habit, ServiceError};
use lifestack_types::EntityId;

fn make_service() -> MockDomainService<Habit> {
    MockDomainService::new()
}

// ── CRUD happy path ──────────────────────────────────────────────

#[tokio::test]
async fn create_stores_entity() {
    let service = make_service();
    let habit = Habit::new("Run", 3);

    let created = service.create(habit.clone()).await.unwrap();
    assert_eq!(created.id(), habit.id());
    assert_eq!(service.len(), 1);
}

#[tokio::test]
async fn update_replaces_entity() {
    let service = make_service();
    let mut habit = service.create(Habit::new("Run", 3)).await.unwrap();

    habit.streak = 5;
    let updated = service.update(habit.clone()).await.unwrap();
    assert_eq!(updated.streak, 5);
    assert_eq!(service.len(), 1);
}

#[tokio::test]
async fn update_unknown_entity_is_not_found() {
    let service = make_service();
    let err = service.update(Habit::new("Ghost", 1)).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_entity() {
    let service = make_service();
    let habit = service.create(Habit::new("Run", 3)).await.unwrap();

    service.delete(habit.id()).await.unwrap();
    assert!(service.is_empty());
}

#[tokio::test]
async fn delete_unknown_entity_is_not_found() {
    let service = make_service();
    let err = service.delete(EntityId::new()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn fetch_all_returns_seeded_entities() {
    let service =
        MockDomainService::with_entities([Habit::new("Run", 3), Habit::new("Read", 7)]);
    let all = service.fetch_all().await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn insight_reports_entity_id() {
    let service = make_service();
    let habit = service.create(Habit::new("Run", 3)).await.unwrap();

    let insight = service.insight(habit.id()).await.unwrap();
    assert_eq!(insight["entity_id"], habit.id().to_string());
}

#[tokio::test]
async fn insight_unknown_entity_is_not_found() {
    let service = make_service();
    let err = service.insight(EntityId::new()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

// ── Failure injection ────────────────────────────────────────────

#[tokio::test]
async fn injected_failure_rejects_and_mutates_nothing() {
    let service = make_service();
    service.fail_with("backend down");

    let err = service.create(Habit::new("Run", 3)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Unavailable(_)));
    assert!(service.is_empty());

    service.succeed();
    service.create(Habit::new("Run", 3)).await.unwrap();
    assert_eq!(service.len(), 1);
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let service = make_service();
    let habit = service.create(Habit::new("Run", 3)).await.unwrap();
    let _ = service.fetch_all().await.unwrap();
    service.delete(habit.id()).await.unwrap();

    assert_eq!(service.calls(), vec!["create", "fetch_all", "delete"]);
}
