//! Conformance test suite for [`CodeStore`] implementations.
//!
//! Each function takes a fresh, empty store and asserts one aspect of the
//! trait contract. Every backend runs the same suite:
//!
//! ```no_run
//! use codeguard_storage::{conformance, MemoryCodeStore};
//!
//! # async fn example() {
//! conformance::insert_then_contains_any_variant(&MemoryCodeStore::new()).await;
//! # }
//! ```
//!
//! # Test Categories
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | Normalization | Trim + upper-case equivalence |
//! | Insert | Idempotence, persisted order |
//! | Remove | Completeness, no-op on absent codes |
//! | Remove all | Clears fully, safe on empty store |
//! | Input validation | Empty codes rejected by every operation; shape limits on insert only |
//! | Concurrent | No lost updates, no duplicates |

use std::{collections::HashSet, sync::Arc};

use crate::{assert_invalid_input, backend::CodeStore, health::HealthProbe};

// ============================================================================
// Normalization
// ============================================================================

/// After `insert("abc")`, `contains("ABC")` is true.
pub async fn insert_then_contains_any_variant<S: CodeStore>(store: &S) {
    store.insert("abc").await.expect("insert");
    for variant in ["abc", "ABC", " abc ", "\tAbC\n"] {
        assert!(store.contains(variant).await.expect("contains"), "{variant:?} should match");
    }
    assert!(!store.contains("abd").await.expect("contains"), "unrelated code should not match");
}

/// `list` returns normalized forms.
pub async fn list_returns_normalized_codes<S: CodeStore>(store: &S) {
    store.insert("  whxgpo ").await.expect("insert");
    assert_eq!(store.list().await.expect("list"), vec!["WHXGPO".to_owned()]);
}

// ============================================================================
// Insert
// ============================================================================

/// Inserting the same code twice leaves one entry.
pub async fn insert_is_idempotent<S: CodeStore>(store: &S) {
    store.insert("x1").await.expect("first insert");
    store.insert("x1").await.expect("second insert");
    store.insert(" X1 ").await.expect("variant insert");
    assert_eq!(store.list().await.expect("list"), vec!["X1".to_owned()]);
}

/// `list` preserves insertion order.
pub async fn list_preserves_insertion_order<S: CodeStore>(store: &S) {
    for code in ["c", "a", "b"] {
        store.insert(code).await.expect("insert");
    }
    assert_eq!(store.list().await.expect("list"), vec!["C", "A", "B"]);
}

/// A snapshot returned by `list` is unaffected by later mutations.
pub async fn list_is_a_snapshot<S: CodeStore>(store: &S) {
    store.insert("a").await.expect("insert");
    let snapshot = store.list().await.expect("list");
    store.insert("b").await.expect("insert");
    assert_eq!(snapshot, vec!["A"]);
    assert_eq!(store.list().await.expect("list"), vec!["A", "B"]);
}

// ============================================================================
// Remove
// ============================================================================

/// `insert(a)`, `insert(b)`, `remove(a)` leaves `[B]`.
pub async fn remove_leaves_other_codes<S: CodeStore>(store: &S) {
    store.insert("a").await.expect("insert a");
    store.insert("b").await.expect("insert b");
    store.remove("a").await.expect("remove a");
    assert_eq!(store.list().await.expect("list"), vec!["B"]);
    assert!(!store.contains("a").await.expect("contains"));
}

/// Removing by a normalization-equivalent variant removes the code.
pub async fn remove_matches_normalized_form<S: CodeStore>(store: &S) {
    store.insert("ABC").await.expect("insert");
    store.remove(" abc ").await.expect("remove");
    assert!(!store.contains("ABC").await.expect("contains"));
    assert!(store.list().await.expect("list").is_empty());
}

/// Removing an absent code is a no-op.
pub async fn remove_absent_is_noop<S: CodeStore>(store: &S) {
    store.insert("keep").await.expect("insert");
    store.remove("ghost").await.expect("remove of absent code should succeed");
    assert_eq!(store.list().await.expect("list"), vec!["KEEP"]);
}

/// A removed code can be inserted again.
pub async fn reinsert_after_remove<S: CodeStore>(store: &S) {
    store.insert("again").await.expect("insert");
    store.remove("again").await.expect("remove");
    store.insert("again").await.expect("reinsert");
    assert_eq!(store.list().await.expect("list"), vec!["AGAIN"]);
}

// ============================================================================
// Remove all
// ============================================================================

/// `remove_all` clears every code.
pub async fn remove_all_clears_everything<S: CodeStore>(store: &S) {
    for code in ["123abc", "456def", "whxgpo"] {
        store.insert(code).await.expect("insert");
    }
    store.remove_all().await.expect("remove_all");
    assert!(store.list().await.expect("list").is_empty());
    for code in ["123abc", "456def", "whxgpo"] {
        assert!(!store.contains(code).await.expect("contains"), "{code} should be gone");
    }
}

/// `remove_all` on an empty store succeeds.
pub async fn remove_all_on_empty_store<S: CodeStore>(store: &S) {
    store.remove_all().await.expect("remove_all on empty store");
    assert!(store.list().await.expect("list").is_empty());
}

// ============================================================================
// Input validation
// ============================================================================

/// Every code-taking operation rejects empty and blank codes.
pub async fn empty_code_is_invalid_input<S: CodeStore>(store: &S) {
    for raw in ["", "   ", "\t\n"] {
        assert_invalid_input!(store.contains(raw).await);
        assert_invalid_input!(store.insert(raw).await);
        assert_invalid_input!(store.remove(raw).await);
    }
    assert!(store.list().await.expect("list").is_empty(), "rejected input must not persist");
}

/// Codes with interior line breaks are rejected rather than split.
pub async fn interior_newline_is_invalid_input<S: CodeStore>(store: &S) {
    assert_invalid_input!(store.insert("a\nb").await);
    assert!(store.list().await.expect("list").is_empty());
}

/// Lookups with a control character match nothing instead of failing.
pub async fn control_character_lookup_matches_nothing<S: CodeStore>(store: &S) {
    store.insert("ab").await.expect("insert");
    assert!(!store.contains("a\tb").await.expect("contains with control character"));
    store.remove("a\tb").await.expect("remove with control character");
    assert_eq!(store.list().await.expect("list"), vec!["AB"]);
}

/// Over-length codes are refused on insert but are ordinary lookup keys.
pub async fn over_limit_lookup_matches_nothing<S: CodeStore>(store: &S) {
    let long = "x".repeat(crate::DEFAULT_MAX_CODE_LEN + 1);
    assert_invalid_input!(store.insert(&long).await);
    assert!(!store.contains(&long).await.expect("contains over-limit code"));
    store.remove(&long).await.expect("remove over-limit code");
    assert!(store.list().await.expect("list").is_empty());
}

// ============================================================================
// Health
// ============================================================================

/// A freshly opened store reports healthy on both probes.
pub async fn fresh_store_is_healthy<S: CodeStore>(store: &S) {
    for probe in [HealthProbe::Liveness, HealthProbe::Readiness] {
        let status = store.health_check(probe).await.expect("health check");
        assert!(status.is_healthy(), "{probe} should be healthy: {status}");
    }
}

// ============================================================================
// Concurrent access
// ============================================================================

/// Concurrent inserts of distinct codes all persist, without duplicates.
pub async fn concurrent_distinct_inserts_all_persist<S: CodeStore + 'static>(store: Arc<S>) {
    let mut handles = Vec::new();
    for i in 0..32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.insert(&format!("conc-{i:04}")).await.expect("concurrent insert");
        }));
    }
    for handle in handles {
        handle.await.expect("task join");
    }

    let codes = store.list().await.expect("list");
    assert_eq!(codes.len(), 32, "every insert must persist: {codes:?}");
    let unique: HashSet<&String> = codes.iter().collect();
    assert_eq!(unique.len(), codes.len(), "no duplicates expected");
    for i in 0..32 {
        assert!(codes.contains(&format!("CONC-{i:04}")), "missing CONC-{i:04}");
    }
}

/// Concurrent inserts of the same code leave exactly one entry.
pub async fn concurrent_same_code_inserts_do_not_duplicate<S: CodeStore + 'static>(
    store: Arc<S>,
) {
    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        // Alternate spellings of the same code.
        let raw = if i % 2 == 0 { "same" } else { " SAME " };
        handles.push(tokio::spawn(async move {
            store.insert(raw).await.expect("concurrent insert");
        }));
    }
    for handle in handles {
        handle.await.expect("task join");
    }
    assert_eq!(store.list().await.expect("list"), vec!["SAME"]);
}

/// A remove racing an insert of the same code ends in one of the two valid
/// states, and the store stays consistent.
pub async fn remove_racing_insert_resolves<S: CodeStore + 'static>(store: Arc<S>) {
    for round in 0..10 {
        let code = format!("race-{round}");
        let inserter = {
            let store = Arc::clone(&store);
            let code = code.clone();
            tokio::spawn(async move { store.insert(&code).await })
        };
        let remover = {
            let store = Arc::clone(&store);
            let code = code.clone();
            tokio::spawn(async move { store.remove(&code).await })
        };
        inserter.await.expect("join").expect("insert");
        remover.await.expect("join").expect("remove");

        let present = store.contains(&code).await.expect("contains");
        let listed = store.list().await.expect("list");
        let occurrences = listed.iter().filter(|c| **c == code.to_uppercase()).count();
        assert_eq!(occurrences, usize::from(present), "list and contains disagree for {code}");
    }
}
