//! End-to-end registry behavior over both store backends.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::{fs, sync::Arc};

use codeguard_authn::SharedSecret;
use codeguard_registry::{
    CODE_REQUIRED, RegistryConfig, RegistryError, RegistryService,
    response::{ALL_CODES_REMOVED, CODE_ADDED, CODE_REMOVED},
};
use codeguard_storage::{
    CodeStore, MemoryCodeStore,
    testutil::{TempFileStore, populated_memory_store},
};
use serde_json::json;

const SECRET: &str = "s3cret";

fn secret() -> SharedSecret {
    SharedSecret::new(SECRET).expect("secret")
}

macro_rules! scenario_suite {
    ($backend:ident, $make:expr) => {
        mod $backend {
            use super::*;

            async fn service() -> RegistryService<impl CodeStore> {
                RegistryService::new(Arc::new($make), secret())
            }

            #[tokio::test]
            async fn inserted_code_matches_any_case() {
                let service = service().await;
                let added = service.add(Some("abc"), Some(SECRET)).await.expect("add");
                assert_eq!(added.message, CODE_ADDED);
                assert!(service.check(Some("ABC")).await.expect("check").valid);
            }

            #[tokio::test]
            async fn double_insert_lists_once() {
                let service = service().await;
                service.add(Some("x1"), Some(SECRET)).await.expect("add");
                service.add(Some("x1"), Some(SECRET)).await.expect("add again");
                assert_eq!(service.list().await.expect("list").codes, vec!["X1"]);
            }

            #[tokio::test]
            async fn remove_leaves_the_rest() {
                let service = service().await;
                service.add(Some("a"), Some(SECRET)).await.expect("add a");
                service.add(Some("b"), Some(SECRET)).await.expect("add b");
                let removed = service.remove(Some("a"), Some(SECRET)).await.expect("remove");
                assert_eq!(removed.message, CODE_REMOVED);
                assert_eq!(service.list().await.expect("list").codes, vec!["B"]);
            }

            #[tokio::test]
            async fn remove_all_on_empty_store() {
                let service = service().await;
                let cleared = service.remove_all(Some(SECRET)).await.expect("remove_all");
                assert_eq!(cleared.message, ALL_CODES_REMOVED);
                assert!(service.list().await.expect("list").codes.is_empty());
            }

            #[tokio::test]
            async fn empty_check_is_bad_request() {
                let err = service().await.check(Some("")).await.unwrap_err();
                assert_eq!(err.status_code(), 400);
                assert_eq!(
                    serde_json::to_value(err.to_body()).expect("serialize"),
                    json!({ "detail": CODE_REQUIRED })
                );
            }

            #[tokio::test]
            async fn unknown_code_is_not_valid() {
                let service = service().await;
                assert!(!service.check(Some("nope")).await.expect("check").valid);
            }

            #[tokio::test]
            async fn bad_secret_is_forbidden_for_every_mutation() {
                let service = service().await;
                for err in [
                    service.add(Some("a"), Some("wrong")).await.unwrap_err(),
                    service.remove(Some("a"), Some("wrong")).await.unwrap_err(),
                    service.remove_all(Some("wrong")).await.unwrap_err(),
                    service.add(Some("a"), None).await.unwrap_err(),
                ] {
                    assert!(matches!(err, RegistryError::Unauthorized), "got {err:?}");
                    assert_eq!(err.status_code(), 403);
                }
            }

            #[tokio::test]
            async fn empty_add_is_bad_request() {
                let err = service().await.add(Some(""), Some(SECRET)).await.unwrap_err();
                assert_eq!(err.status_code(), 400);
            }
        }
    };
}

scenario_suite!(memory, MemoryCodeStore::new());
scenario_suite!(file, TempFileStore::new().await);

#[tokio::test]
async fn service_and_store_share_state() {
    let store = Arc::new(populated_memory_store("seed", 3).await);
    let service = RegistryService::new(Arc::clone(&store), secret());

    assert_eq!(
        service.list().await.expect("list").codes,
        vec!["SEED-000000", "SEED-000001", "SEED-000002"]
    );
    assert!(service.check(Some("seed-000001")).await.expect("check").valid);

    service.remove_all(Some(SECRET)).await.expect("remove_all");
    assert!(service.store().list().await.expect("list").is_empty());
    assert!(store.list().await.expect("list").is_empty());
}

// ---------------------------------------------------------------------------
// Storage faults
// ---------------------------------------------------------------------------

#[tokio::test]
async fn vanished_file_is_server_error() {
    let store = Arc::new(TempFileStore::new().await);
    let service = RegistryService::new(Arc::clone(&store), secret());
    fs::remove_file(store.path()).expect("delete code file");

    for err in [
        service.check(Some("a")).await.unwrap_err(),
        service.add(Some("a"), Some(SECRET)).await.unwrap_err(),
        service.remove(Some("a"), Some(SECRET)).await.unwrap_err(),
        service.remove_all(Some(SECRET)).await.unwrap_err(),
        service.list().await.unwrap_err(),
    ] {
        assert!(matches!(err, RegistryError::Storage(_)), "got {err:?}");
        assert_eq!(err.status_code(), 500);
    }
}

#[tokio::test]
async fn unauthorized_request_wins_over_storage_fault() {
    let store = Arc::new(TempFileStore::new().await);
    let service = RegistryService::new(Arc::clone(&store), secret());
    fs::remove_file(store.path()).expect("delete code file");

    let err = service.remove_all(Some("wrong")).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
}

// ---------------------------------------------------------------------------
// Opening from configuration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn opens_file_store_from_config_with_seed_codes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_path = dir.path().join("codeguard.toml");
    let codes_path = dir.path().join("data").join("codes.txt");
    fs::write(
        &config_path,
        format!(
            "shared_secret = \"{SECRET}\"\n[store]\npath = {:?}\nseed_codes = [\"123abc\", \"456DEF\", \"whxgpo\"]\n",
            codes_path.display().to_string()
        ),
    )
    .expect("write config");

    let config = RegistryConfig::load(config_path.to_str()).expect("load config");
    let service = RegistryService::open(config).await.expect("open service");

    assert_eq!(service.list().await.expect("list").codes, vec!["123ABC", "456DEF", "WHXGPO"]);
    assert_eq!(fs::read_to_string(&codes_path).expect("read"), "123ABC\n456DEF\nWHXGPO\n");

    service.remove_all(Some(SECRET)).await.expect("remove_all");
    assert_eq!(fs::read_to_string(&codes_path).expect("read"), "");
}
