use serde_json::json;
use std::sync::Arc;

use ledo_client::auth::{Credentials, SessionStatus};
use ledo_client::config::ClientOptions;
use ledo_client::storage::{MemoryTokenStore, TokenStore};
use ledo_client::Ledo;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::default().with_base_url(&server.uri())
}

#[tokio::test]
async fn session_survives_a_restart_without_a_new_token_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "tok1",
            "refresh": "ref1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "alice",
            "email": "a@x.com"
        })))
        .mount(&server)
        .await;

    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());

    let first = Ledo::with_store(options(&server), store.clone()).unwrap();
    first
        .auth()
        .sign_in(&Credentials::new("alice", "secret"))
        .await
        .unwrap();
    let user = first.session().current_user().unwrap();
    drop(first);

    // a fresh process restores from storage alone
    let second = Ledo::with_store(options(&server), store).unwrap();
    assert_eq!(second.session().status(), SessionStatus::Unknown);

    second.auth().restore().await;
    assert!(second.session().signed());
    assert_eq!(second.session().current_user(), Some(user));
    assert_eq!(second.session().access_token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn restore_with_empty_storage_resolves_to_signed_out() {
    let server = MockServer::start().await;
    let ledo = Ledo::new(options(&server)).unwrap();

    assert_eq!(ledo.session().status(), SessionStatus::Unknown);
    ledo.auth().restore().await;
    assert_eq!(ledo.session().status(), SessionStatus::SignedOut);
}

#[tokio::test]
async fn sign_out_is_idempotent() {
    let server = MockServer::start().await;
    let ledo = Ledo::new(options(&server)).unwrap();

    ledo.auth().sign_out().await;
    ledo.auth().sign_out().await;

    assert!(!ledo.session().signed());
    assert_eq!(ledo.session().status(), SessionStatus::SignedOut);
}

#[tokio::test]
async fn sign_out_clears_persisted_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "tok1",
            "refresh": "ref1"
        })))
        .mount(&server)
        .await;

    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let ledo = Ledo::with_store(options(&server), store.clone()).unwrap();

    ledo.auth()
        .sign_in(&Credentials::new("alice", "secret"))
        .await
        .unwrap();
    ledo.auth().sign_out().await;

    assert_eq!(store.get("userToken").await, None);
    assert_eq!(store.get("refreshToken").await, None);
    assert_eq!(store.get("userData").await, None);
}
