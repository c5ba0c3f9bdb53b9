//! End-to-end session lifecycle against a file-backed store, with a fresh
//! `SessionManager` standing in for each process start.

use operator_app_lib::adapters::demo_auth::{DEMO_PASSWORD, DEMO_USERNAME};
use operator_app_lib::adapters::{DemoAuthProvider, FileStore};
use operator_app_lib::session::persistence::{ACCESS_TOKEN_KEY, OPERATOR_KEY};
use operator_app_lib::session::{AuthError, SessionManager};
use spio_core::ports::KeyValueStore;
use spio_core::Session;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn start_process(path: &Path) -> SessionManager {
    let auth = DemoAuthProvider::new(Duration::ZERO, Duration::ZERO, chrono::Duration::hours(24))
        .expect("demo provider");
    SessionManager::new(Arc::new(auth), Arc::new(FileStore::new(path)))
}

#[tokio::test]
async fn login_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = start_process(&path);
    assert!(!first.restore().await.is_authenticated());
    let session = first.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
    assert_eq!(
        session.current_operator().unwrap().employee_number,
        "TC-2024-0142"
    );

    let second = start_process(&path);
    let restored = second.restore().await;
    assert!(restored.is_authenticated());
    assert_eq!(
        restored.current_operator().unwrap().id,
        session.current_operator().unwrap().id
    );
    assert_eq!(second.current_token(), first.current_token());
}

#[tokio::test]
async fn logout_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let first = start_process(&path);
    first.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
    first.logout().await;

    let second = start_process(&path);
    assert_eq!(second.restore().await, Session::anonymous());
}

#[tokio::test]
async fn invalid_credentials_never_touch_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let manager = start_process(&path);

    for (user, pass) in [
        (DEMO_USERNAME, "wrong"),
        (DEMO_USERNAME, "demo123!"),
        ("tc-2024-0142", DEMO_PASSWORD),
        ("", DEMO_PASSWORD),
    ] {
        let err = manager.login(user, pass).await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(manager.session(), Session::anonymous());
    }
    assert!(!path.exists());
}

#[tokio::test]
async fn corrupt_record_is_discarded_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileStore::new(&path);
    store.set(ACCESS_TOKEN_KEY, "stale-token").await.unwrap();
    store.set(OPERATOR_KEY, "{\"employeeNumber\":").await.unwrap();

    let manager = start_process(&path);
    assert!(!manager.restore().await.is_authenticated());

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    assert_eq!(reopened.get(OPERATOR_KEY).await.unwrap(), None);

    // The slot is free again for a normal login.
    manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
    assert!(manager.is_authenticated());
}

#[tokio::test]
async fn garbled_store_file_recovers_on_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "{\"spio_access_token\": \"abc\", ").unwrap();

    let first = start_process(&path);
    assert_eq!(first.restore().await, Session::anonymous());
    first.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();

    let second = start_process(&path);
    assert!(second.restore().await.is_authenticated());
    assert_eq!(second.current_token(), first.current_token());
}
