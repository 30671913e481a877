use serde_json::json;
use std::sync::Arc;

use ledo_client::auth::Credentials;
use ledo_client::config::ClientOptions;
use ledo_client::error::Error;
use ledo_client::storage::{MemoryTokenStore, TokenStore};
use ledo_client::Ledo;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::default().with_base_url(&server.uri())
}

async fn mount_token_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "tok1",
            "refresh": "ref1"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_resolves_profile_and_persists_tokens() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "username": "alice",
            "email": "a@x.com"
        })))
        .mount(&server)
        .await;

    let store: Arc<MemoryTokenStore> = Arc::new(MemoryTokenStore::new());
    let ledo = Ledo::with_store(options(&server), store.clone()).unwrap();

    let session = ledo
        .auth()
        .sign_in(&Credentials::new("alice", "secret"))
        .await
        .unwrap();

    assert_eq!(session.access_token, "tok1");
    assert!(ledo.session().signed());

    let user = ledo.session().current_user().unwrap();
    assert_eq!(user.email, "a@x.com");

    // all three values reached secure storage
    assert_eq!(store.get("userToken").await.as_deref(), Some("tok1"));
    assert_eq!(store.get("refreshToken").await.as_deref(), Some("ref1"));
    assert!(store.get("userData").await.is_some());
}

#[tokio::test]
async fn sign_in_with_unavailable_profile_builds_placeholder_user() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server).await;
    // no profile endpoint mounted: the fetch fails with 404

    let ledo = Ledo::new(options(&server)).unwrap();
    ledo.auth()
        .sign_in(&Credentials::new("alice", "secret"))
        .await
        .unwrap();

    let user = ledo.session().current_user().unwrap();
    assert_eq!(user.username, "alice");
    assert!(!user.email.is_empty());
    assert_eq!(user.display_name.as_deref(), Some("alice"));
}

#[tokio::test]
async fn rejected_credentials_surface_as_generic_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let ledo = Ledo::new(options(&server)).unwrap();
    let result = ledo
        .auth()
        .sign_in(&Credentials::new("alice", "wrong"))
        .await;

    assert!(matches!(result, Err(Error::Auth(_))));
    assert!(!ledo.session().signed());
}

#[tokio::test]
async fn failed_sign_in_leaves_existing_session_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "tok1",
            "refresh": "ref1"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let ledo = Ledo::new(options(&server)).unwrap();
    ledo.auth()
        .sign_in(&Credentials::new("alice", "secret"))
        .await
        .unwrap();

    let result = ledo
        .auth()
        .sign_in(&Credentials::new("alice", "typo"))
        .await;
    assert!(result.is_err());

    // the rejection did not disturb the existing session
    assert!(ledo.session().signed());
    assert_eq!(ledo.session().access_token().as_deref(), Some("tok1"));
}

#[tokio::test]
async fn register_creates_an_account_without_signing_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 5,
            "username": "bob",
            "email": "bob@x.com"
        })))
        .mount(&server)
        .await;

    let ledo = Ledo::new(options(&server)).unwrap();
    let user = ledo
        .auth()
        .register("bob", "bob@x.com", "secret")
        .await
        .unwrap();

    assert_eq!(user.id, 5);
    assert!(!ledo.session().signed());
}
