// SPDX-License-Identifier: MIT
// Copyright 2026 RecipeHUB contributors

//! Identity provider flows against a stub Identity Toolkit server.

use recipehub::db::{MemoryStore, RecipeStore, StoreOp};
use recipehub::error::GENERIC_FAILURE;
use recipehub::models::UserProfile;
use recipehub::services::auth::{EMAIL_EXISTS, INVALID_CREDENTIALS, RESET_SENT};
use recipehub::services::{AuthService, Registration};
use recipehub::session::{Identity, SessionHandle};

mod common;
use common::StubServer;

const API_KEY: &str = "test-key";

fn account(uid: &str, email: &str, display_name: &str) -> String {
    serde_json::json!({
        "localId": uid,
        "email": email,
        "displayName": display_name,
        "idToken": "token",
    })
    .to_string()
}

fn provider_error(code: &str) -> String {
    serde_json::json!({ "error": { "code": 400, "message": code } }).to_string()
}

fn auth(server: &StubServer, session: SessionHandle) -> (MemoryStore, AuthService<MemoryStore>) {
    let store = MemoryStore::new();
    let service = AuthService::new(API_KEY, store.clone(), session).with_base_url(&server.base_url);
    (store, service)
}

fn registration() -> Registration {
    Registration {
        full_name: " Ana Cook ".into(),
        email: "ana@example.com".into(),
        password: "secret1".into(),
        confirm_password: "secret1".into(),
        photo: Some("https://example.com/ana.jpg".into()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRATION
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sign_up_creates_profile_then_signs_out() {
    let server = StubServer::start(vec![(
        "accounts:signUp",
        200,
        account("ana-uid", "ana@example.com", ""),
    )])
    .await;
    let session = SessionHandle::fixed(Some(Identity::new("previous")));
    let (store, service) = auth(&server, session.clone());

    let identity = service.sign_up(&registration()).await.unwrap();
    assert_eq!(identity.uid, "ana-uid");
    assert!(session.current().is_none(), "registration ends signed out");

    let profile = store.get_profile("ana-uid").await.unwrap().expect("profile created");
    assert_eq!(profile.full_name, "Ana Cook");
    assert_eq!(profile.email, "ana@example.com");
    assert_eq!(profile.photo.as_deref(), Some("https://example.com/ana.jpg"));
    assert!(profile.created_at.is_some());
    assert!(!profile.notifications_enabled());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].target.contains("key=test-key"));
    let body = requests[0].json();
    assert_eq!(body["email"], "ana@example.com");
    assert_eq!(body["returnSecureToken"], true);
}

#[tokio::test]
async fn test_duplicate_email_is_reported_and_writes_nothing() {
    let server = StubServer::start(vec![("accounts:signUp", 400, provider_error("EMAIL_EXISTS"))]).await;
    let (store, service) = auth(&server, SessionHandle::new());

    let err = service.sign_up(&registration()).await.unwrap_err();
    assert_eq!(err.user_message(), EMAIL_EXISTS);
    assert_eq!(store.calls(StoreOp::PutProfile), 0);
}

#[tokio::test]
async fn test_invalid_registration_never_reaches_provider() {
    let server = StubServer::start(vec![]).await;
    let (_store, service) = auth(&server, SessionHandle::new());

    let mut form = registration();
    form.confirm_password = "secret2".into();
    assert!(service.sign_up(&form).await.is_err());
    assert!(server.requests().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// SIGN-IN
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_sign_in_publishes_session() {
    let server = StubServer::start(vec![(
        "accounts:signInWithPassword",
        200,
        account("ana-uid", "ana@example.com", "Ana Cook"),
    )])
    .await;
    let session = SessionHandle::new();
    let mut changes = session.watch();
    let (_store, service) = auth(&server, session.clone());

    service.sign_in(" ana@example.com ", "secret1").await.unwrap();

    let current = session.current().expect("signed in");
    assert_eq!(current.uid, "ana-uid");
    assert_eq!(current.email.as_deref(), Some("ana@example.com"));
    assert_eq!(current.display_name.as_deref(), Some("Ana Cook"));
    assert!(changes.has_changed().unwrap());
    assert_eq!(server.requests()[0].json()["email"], "ana@example.com");

    service.sign_out();
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_rejected_credentials_leave_session_signed_out() {
    let server = StubServer::start(vec![(
        "accounts:signInWithPassword",
        400,
        provider_error("INVALID_LOGIN_CREDENTIALS"),
    )])
    .await;
    let session = SessionHandle::new();
    let (_store, service) = auth(&server, session.clone());

    let err = service.sign_in("ana@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), INVALID_CREDENTIALS);
    assert!(session.current().is_none());
}

#[tokio::test]
async fn test_unreachable_provider_is_generic() {
    // Bind then drop to get a port nothing listens on.
    let addr = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap();
    let service = AuthService::new(API_KEY, MemoryStore::new(), SessionHandle::new())
        .with_base_url(format!("http://{}", addr));

    let err = service.sign_in("ana@example.com", "secret1").await.unwrap_err();
    assert_eq!(err.user_message(), GENERIC_FAILURE);
}

#[tokio::test]
async fn test_password_reset_request() {
    let server = StubServer::start(vec![(
        "accounts:sendOobCode",
        200,
        r#"{"email":"ana@example.com"}"#.to_string(),
    )])
    .await;
    let (_store, service) = auth(&server, SessionHandle::new());

    assert_eq!(service.send_password_reset("ana@example.com").await.unwrap(), RESET_SENT);
    let body = server.requests()[0].json();
    assert_eq!(body["requestType"], "PASSWORD_RESET");
    assert_eq!(body["email"], "ana@example.com");
}

// ═══════════════════════════════════════════════════════════════════════════
// FEDERATED SIGN-IN
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_first_federated_sign_in_creates_profile_once() {
    let server = StubServer::start(vec![(
        "accounts:signInWithIdp",
        200,
        account("g-uid", "gcook@example.com", "Gina Cook"),
    )])
    .await;
    let session = SessionHandle::new();
    let (store, service) = auth(&server, session.clone());

    let identity = service.sign_in_with_idp("google.com", "idp-token").await.unwrap();
    assert_eq!(identity.uid, "g-uid");
    assert_eq!(session.current().unwrap().uid, "g-uid");

    let profile = store.get_profile("g-uid").await.unwrap().expect("profile created");
    assert_eq!(profile.full_name, "Gina Cook");
    assert_eq!(profile.email, "gcook@example.com");
    assert_eq!(profile.provider.as_deref(), Some("google"));

    let body = server.requests()[0].json();
    let post_body = body["postBody"].as_str().unwrap();
    assert!(post_body.contains("id_token=idp-token"));
    assert!(post_body.contains("providerId=google.com"));

    // A returning user keeps their edited profile.
    store
        .put_profile(
            "g-uid",
            &UserProfile {
                bio: "Pastry".into(),
                ..profile
            },
        )
        .await
        .unwrap();
    let writes = store.calls(StoreOp::PutProfile);
    service.sign_in_with_idp("google.com", "idp-token").await.unwrap();
    assert_eq!(store.calls(StoreOp::PutProfile), writes);
    assert_eq!(store.get_profile("g-uid").await.unwrap().unwrap().bio, "Pastry");
}
