use lifestack_types::HealthStatus;

#[test]
fn healthy_predicates() {
    assert!(HealthStatus::Healthy.is_healthy());
    assert!(!HealthStatus::Healthy.is_error());
}

#[test]
fn warning_is_neither_healthy_nor_error() {
    let status = HealthStatus::Warning("stale".to_string());
    assert!(!status.is_healthy());
    assert!(!status.is_error());
}

#[test]
fn error_predicates() {
    let status = HealthStatus::Error("service down".to_string());
    assert!(!status.is_healthy());
    assert!(status.is_error());
}

#[test]
fn display_includes_detail() {
    assert_eq!(HealthStatus::Healthy.to_string(), "healthy");
    assert_eq!(
        HealthStatus::Warning("no sync in 31m".to_string()).to_string(),
        "warning: no sync in 31m"
    );
    assert_eq!(
        HealthStatus::Error("boom".to_string()).to_string(),
        "error: boom"
    );
}

#[test]
fn serde_tagged_representation() {
    let json = serde_json::to_value(HealthStatus::Warning("stale".to_string())).unwrap();
    assert_eq!(json["status"], "warning");
    assert_eq!(json["detail"], "stale");

    let healthy = serde_json::to_value(HealthStatus::Healthy).unwrap();
    assert_eq!(healthy["status"], "healthy");
}

#[test]
fn serde_roundtrip() {
    for status in [
        HealthStatus::Healthy,
        HealthStatus::Warning("w".to_string()),
        HealthStatus::Error("e".to_string()),
    ] {
        let json = serde_json::to_string(&status).unwrap();
        let parsed: HealthStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }
}
