//! Session lifecycle integration tests
//!
//! These run the client against a mock auth service and a temporary session
//! directory, the same way the CLI uses it.

use motofix::core::storage::{TOKEN_KEY, USER_KEY};
use motofix::core::{FileSessionStorage, SessionStorage};
use motofix::{AuthState, ClientConfig, Event, MotofixClient, VerifyOutcome};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.services.auth_url = server.uri();
    config.services.requests_url = server.uri();
    config.session.verify_retry_delay = Duration::from_millis(10);
    config
}

fn client_with_storage(server: &MockServer, dir: &TempDir) -> (MotofixClient, Arc<FileSessionStorage>) {
    let storage = Arc::new(FileSessionStorage::open(dir.path()).unwrap());
    let client = MotofixClient::builder()
        .config(config_for(server))
        .storage(storage.clone())
        .build()
        .unwrap();
    (client, storage)
}

fn user_json() -> serde_json::Value {
    json!({"id": "u-1", "phone": "+256700000000", "name": "Amina", "role": "driver"})
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/verify-otp"))
        .and(body_json(json!({"phone": "+256700000000", "code": "1234"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"token": "T", "user": user_json()})),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sign_in_persists_token_and_user() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    let dir = TempDir::new().unwrap();
    let (client, storage) = client_with_storage(&server, &dir);

    let user = client.sign_in("+256700000000", "1234", None).await.unwrap();
    assert_eq!(user.id, "u-1");

    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("T"));
    let stored: serde_json::Value =
        serde_json::from_str(&storage.get(USER_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(stored["id"], "u-1");
    assert_eq!(stored["phone"], "+256700000000");
    assert!(client.state().is_authenticated());
}

#[tokio::test]
async fn test_restore_after_restart_is_tentative() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    let dir = TempDir::new().unwrap();

    {
        let (client, _) = client_with_storage(&server, &dir);
        client.sign_in("0700000000", "1234", None).await.unwrap();
    }

    let (client, _) = client_with_storage(&server, &dir);
    match client.restore().unwrap() {
        AuthState::Tentative(session) => {
            assert_eq!(session.token, "T");
            assert_eq!(session.user.greeting_name(), "Amina");
        }
        other => panic!("expected tentative session, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rejected_token_clears_storage_and_navigates_to_login() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/requests"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, storage) = client_with_storage(&server, &dir);
    client.sign_in("+256700000000", "1234", None).await.unwrap();
    let mut events = client.subscribe();

    let err = client.requests().list_requests().await.unwrap_err();
    assert!(err.is_credential_invalid());

    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(storage.get(USER_KEY).unwrap(), None);
    assert_eq!(client.state(), AuthState::Unauthenticated);

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(seen.contains(&Event::SessionExpired));
    assert!(seen.contains(&Event::navigate_to_login()));
}

#[tokio::test]
async fn test_concurrent_verification_makes_one_call() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"user": user_json()}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, _) = client_with_storage(&server, &dir);
    client.sign_in("+256700000000", "1234", None).await.unwrap();

    let (first, second) = tokio::join!(client.verify(), client.verify());
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|o| o.is_verified()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|o| matches!(o, VerifyOutcome::AlreadyInFlight))
    );
    assert!(client.state().is_confirmed());
}

#[tokio::test]
async fn test_unreachable_server_keeps_cached_session() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, storage) = client_with_storage(&server, &dir);
    client.sign_in("+256700000000", "1234", None).await.unwrap();

    let outcome = client.verify().await;
    assert!(matches!(outcome, VerifyOutcome::Unverified { .. }));
    assert!(client.state().is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("T"));
}

#[tokio::test]
async fn test_sign_out_clears_locally_and_invalidates_remotely() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (client, storage) = client_with_storage(&server, &dir);
    client.sign_in("+256700000000", "1234", None).await.unwrap();

    let handle = client.sign_out().unwrap().expect("token was stored");
    assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(client.state(), AuthState::Unauthenticated);
    handle.await.unwrap();
}
