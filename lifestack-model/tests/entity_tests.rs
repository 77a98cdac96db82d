use lifestack_model::{DomainEntity, FinancialTransaction, Habit, PlannerTask};
use lifestack_types::{Domain, Timestamp};
use pretty_assertions::assert_eq;

// ── Habit ────────────────────────────────────────────────────────

#[test]
fn habit_domain_and_accessors() {
    let habit = Habit::new("Run", 3);
    assert_eq!(Habit::DOMAIN, Domain::Habit);
    assert_eq!(habit.display_name(), "Run");
    assert_eq!(habit.frequency, 3);
    assert_eq!(habit.streak, 0);
    assert_eq!(habit.id(), habit.id);
}

#[test]
fn habits_get_distinct_ids() {
    assert_ne!(Habit::new("a", 1).id(), Habit::new("a", 1).id());
}

// ── FinancialTransaction ─────────────────────────────────────────

#[test]
fn transaction_domain_and_accessors() {
    let tx = FinancialTransaction::new("Coffee", -4.5, "food");
    assert_eq!(FinancialTransaction::DOMAIN, Domain::Financial);
    assert_eq!(tx.display_name(), "Coffee");
    assert_eq!(tx.amount, -4.5);
    assert_eq!(tx.category, "food");
}

// ── PlannerTask ──────────────────────────────────────────────────

#[test]
fn task_domain_and_accessors() {
    let task = PlannerTask::new("Write report");
    assert_eq!(PlannerTask::DOMAIN, Domain::Planner);
    assert_eq!(task.display_name(), "Write report");
    assert!(!task.completed);
    assert!(task.due.is_none());
}

#[test]
fn task_with_due_date() {
    let due = Timestamp::now();
    let task = PlannerTask::new("Pay rent").with_due(due);
    assert_eq!(task.due, Some(due));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn habit_serde_roundtrip() {
    let habit = Habit::new("Meditate", 7);
    let json = serde_json::to_string(&habit).unwrap();
    let parsed: Habit = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, habit);
}

#[test]
fn transaction_serde_roundtrip() {
    let tx = FinancialTransaction::new("Rent", -1200.0, "housing");
    let json = serde_json::to_string(&tx).unwrap();
    let parsed: FinancialTransaction = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, tx);
}

#[test]
fn task_serde_roundtrip() {
    let task = PlannerTask::new("Call dentist").with_due(Timestamp::now());
    let json = serde_json::to_string(&task).unwrap();
    let parsed: PlannerTask = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, task);
}
