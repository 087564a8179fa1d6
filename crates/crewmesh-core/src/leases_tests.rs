use chrono::{Duration, Utc};

use crewmesh_protocols::types::ResourceKind;

use super::*;

fn ttl() -> Duration {
    Duration::minutes(30)
}

#[test]
fn test_claim_then_conflict_then_release_then_claim() {
    let mut state = CoordState::new();
    let now = Utc::now();

    let first = state.claim_resource(ResourceKind::Branch, "feature/x", "a", "write", now, ttl());
    assert!(first.claimed);

    let contested =
        state.claim_resource(ResourceKind::Branch, "feature/x", "b", "write", now, ttl());
    assert!(!contested.claimed);
    assert_eq!(contested.conflicts_with, vec!["a"]);
    // Denied claim mutates nothing.
    assert_eq!(state.claim_count(), 1);

    let release = state.release_resource(ResourceKind::Branch, "feature/x", "a");
    assert!(release.released);

    let retry = state.claim_resource(ResourceKind::Branch, "feature/x", "b", "write", now, ttl());
    assert!(retry.claimed);
}

#[test]
fn test_conflict_ignores_operation_strings() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::File, "src/lib.rs", "a", "read", now, ttl());

    // A read claim still blocks another instance's read.
    let outcome = state.claim_resource(ResourceKind::File, "src/lib.rs", "b", "read", now, ttl());
    assert!(!outcome.claimed);
}

#[test]
fn test_same_resource_id_different_kind_does_not_conflict() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::Issue, "42", "a", "write", now, ttl());

    let outcome = state.claim_resource(ResourceKind::Pr, "42", "b", "write", now, ttl());
    assert!(outcome.claimed);
}

#[test]
fn test_reclaim_by_holder_refreshes_instead_of_stacking() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::Branch, "feature/x", "a", "write", now, ttl());

    let later = now + Duration::minutes(20);
    let refresh =
        state.claim_resource(ResourceKind::Branch, "feature/x", "a", "write", later, ttl());
    assert!(refresh.claimed);
    assert_eq!(state.claim_count(), 1);

    // The refreshed lease outlives the original window.
    assert_eq!(
        state.sweep_expired_claims(now + Duration::minutes(31)),
        0
    );
    assert_eq!(
        state.sweep_expired_claims(later + Duration::minutes(31)),
        1
    );
}

#[test]
fn test_expired_claim_does_not_conflict() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::Branch, "feature/x", "a", "write", now, ttl());

    let after_expiry = now + Duration::minutes(31);
    let outcome =
        state.claim_resource(ResourceKind::Branch, "feature/x", "b", "write", after_expiry, ttl());
    assert!(outcome.claimed);
}

#[test]
fn test_release_is_idempotent_and_exact() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::Branch, "feature/x", "a", "write", now, ttl());

    // Wrong holder releases nothing.
    assert!(
        !state
            .release_resource(ResourceKind::Branch, "feature/x", "b")
            .released
    );
    assert!(
        state
            .release_resource(ResourceKind::Branch, "feature/x", "a")
            .released
    );
    assert!(
        !state
            .release_resource(ResourceKind::Branch, "feature/x", "a")
            .released
    );
}

#[test]
fn test_sweep_removes_only_expired_claims() {
    let mut state = CoordState::new();
    let now = Utc::now();
    state.claim_resource(ResourceKind::Branch, "old", "a", "write", now - Duration::minutes(40), ttl());
    state.claim_resource(ResourceKind::Branch, "fresh", "a", "write", now, ttl());

    let removed = state.sweep_expired_claims(now);
    assert_eq!(removed, 1);
    assert_eq!(state.claim_count(), 1);

    // Sweeping again is a no-op.
    assert_eq!(state.sweep_expired_claims(now), 0);
}
