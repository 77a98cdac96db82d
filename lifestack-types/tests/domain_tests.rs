use lifestack_types::Domain;

// ── Tags ─────────────────────────────────────────────────────────

#[test]
fn stable_string_tags() {
    assert_eq!(Domain::Habit.as_str(), "habit");
    assert_eq!(Domain::Financial.as_str(), "financial");
    assert_eq!(Domain::Planner.as_str(), "planner");
}

#[test]
fn display_matches_as_str() {
    for domain in Domain::all() {
        assert_eq!(domain.to_string(), domain.as_str());
    }
}

// ── Iteration order ──────────────────────────────────────────────

#[test]
fn all_is_fixed_order() {
    assert_eq!(
        Domain::all(),
        [Domain::Habit, Domain::Financial, Domain::Planner]
    );
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_roundtrip() {
    for domain in Domain::all() {
        let parsed: Domain = domain.as_str().parse().unwrap();
        assert_eq!(parsed, domain);
    }
}

#[test]
fn parse_rejects_unknown_tag() {
    let err = "astrology".parse::<Domain>().unwrap_err();
    assert!(err.to_string().contains("astrology"));
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Domain::Habit).unwrap(), "\"habit\"");
    assert_eq!(
        serde_json::to_string(&Domain::Financial).unwrap(),
        "\"financial\""
    );
}

#[test]
fn serde_roundtrip() {
    for domain in Domain::all() {
        let json = serde_json::to_string(&domain).unwrap();
        let parsed: Domain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, domain);
    }
}
