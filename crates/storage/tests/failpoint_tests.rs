#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p codeguard-storage --features failpoints --test failpoint_tests
//! ```
#![cfg(feature = "failpoints")]

use codeguard_storage::{CodeStore, LineCodec, assert_unavailable, testutil::TempFileStore};

#[tokio::test]
async fn append_failpoint_reports_unavailable_and_writes_nothing() {
    let scenario = fail::FailScenario::setup();
    let store = TempFileStore::new().await;
    fail::cfg("code-file-append", "return").expect("failed to configure fail point");

    assert_unavailable!(store.insert("a").await);
    assert_eq!(store.raw_contents(), "");

    fail::remove("code-file-append");
    store.insert("a").await.expect("insert after fail point removed");
    assert_eq!(store.raw_contents(), "A\n");

    scenario.teardown();
}

#[tokio::test]
async fn rename_failpoint_leaves_previous_contents_intact() {
    let scenario = fail::FailScenario::setup();
    let store = TempFileStore::new().await;
    store.insert("a").await.expect("insert");
    store.insert("b").await.expect("insert");
    fail::cfg("code-file-before-rename", "return").expect("failed to configure fail point");

    assert_unavailable!(store.remove("a").await);
    assert_unavailable!(store.remove_all().await);
    assert!(!store.path().with_file_name("codes.txt.tmp").exists(), "staging file left behind");

    // Readers still see the last committed state.
    assert_eq!(store.raw_contents(), "A\nB\n");
    assert_eq!(store.list().await.expect("list"), vec!["A", "B"]);

    fail::remove("code-file-before-rename");
    store.remove("a").await.expect("remove after fail point removed");
    assert_eq!(store.raw_contents(), "B\n");

    scenario.teardown();
}

#[tokio::test]
async fn partial_append_is_rolled_back() {
    let scenario = fail::FailScenario::setup();
    let store = TempFileStore::new().await;
    store.insert("old").await.expect("insert");
    fail::cfg("code-file-partial-append", "return").expect("failed to configure fail point");

    assert_unavailable!(store.insert("interrupted").await);

    // The file still decodes to the state before the failed insert.
    assert_eq!(store.raw_contents(), "OLD\n");
    let decoded = LineCodec::decode(store.raw_contents().as_bytes()).expect("decode");
    assert!(!decoded.needs_rewrite());
    assert_eq!(decoded.codes.to_strings(), vec!["OLD"]);

    fail::remove("code-file-partial-append");
    store.insert("new").await.expect("insert after fail point removed");
    assert!(store.contains("NEW").await.expect("contains"));
    assert_eq!(store.list().await.expect("list"), vec!["OLD", "NEW"]);
    assert_eq!(store.raw_contents(), "OLD\nNEW\n");

    scenario.teardown();
}
