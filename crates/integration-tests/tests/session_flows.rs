//! Session manager flows against a mock auth collaborator.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use ticketlive_integration_tests::{TestHarness, credentials, user_json};
use ticketlive_storefront::api::NewAccount;
use ticketlive_storefront::broadcast::SessionTransition;
use ticketlive_storefront::models::session::{UserSession, storage_keys};
use ticketlive_storefront::services::AuthError;

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn login_persists_session_and_token() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(
            serde_json::json!({"email": "ana@example.com", "password": "pw"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "message": "ok",
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    let session = harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    assert_eq!(session.name, "Ana");
    assert!(harness.session.is_authenticated());

    // In-memory state and persisted copy are identical
    let persisted: UserSession = harness.storage.get(storage_keys::USER).unwrap();
    assert_eq!(persisted, session);
    assert_eq!(
        harness.storage.get::<String>(storage_keys::TOKEN).unwrap(),
        "tok-abc"
    );
}

#[tokio::test]
async fn failed_login_leaves_anonymous_with_no_keys() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Credenciales incorrectas",
        })))
        .mount(&harness.server)
        .await;

    let err = harness
        .session
        .login(credentials("ana@example.com", "wrong"))
        .await
        .unwrap_err();

    // The collaborator's message is surfaced verbatim
    match err {
        AuthError::InvalidCredentials(message) => assert_eq!(message, "Credenciales incorrectas"),
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }

    assert!(!harness.session.is_authenticated());
    assert!(!harness.storage.contains(storage_keys::USER));
    assert!(!harness.storage.contains(storage_keys::TOKEN));
}

#[tokio::test]
async fn login_broadcasts_after_persisting() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    // An observer mounted before login, reading storage when notified -
    // read-your-writes must hold across components
    let storage = harness.storage.clone();
    let observed = Arc::new(AtomicUsize::new(0));
    let observed_by_subscriber = Arc::clone(&observed);
    let _subscription = harness.session.subscribe_fn(move |transition| {
        if transition == SessionTransition::SignedIn {
            assert!(storage.contains(storage_keys::USER));
            observed_by_subscriber.fetch_add(1, Ordering::SeqCst);
        }
    });

    harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    // Delivered synchronously, before login returned
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn register_does_not_authenticate() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_partial_json(serde_json::json!({
            "email": "ana@example.com",
            "confirmPassword": "pw",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "success": true,
            "message": "created",
        })))
        .mount(&harness.server)
        .await;

    harness
        .session
        .register(NewAccount {
            name: "Ana".to_string(),
            email: "ana@example.com".parse().unwrap(),
            password: "pw".to_owned().into(),
            confirm_password: "pw".to_owned().into(),
            phone: None,
            address: None,
        })
        .await
        .unwrap();

    // A subsequent explicit login is required
    assert!(!harness.session.is_authenticated());
    assert!(!harness.storage.contains(storage_keys::USER));
}

#[tokio::test]
async fn register_surfaces_collaborator_message() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "message": "El correo ya está registrado",
        })))
        .mount(&harness.server)
        .await;

    let err = harness
        .session
        .register(NewAccount {
            name: "Ana".to_string(),
            email: "ana@example.com".parse().unwrap(),
            password: "pw".to_owned().into(),
            confirm_password: "pw".to_owned().into(),
            phone: None,
            address: None,
        })
        .await
        .unwrap_err();

    match err {
        AuthError::Registration(message) => assert_eq!(message, "El correo ya está registrado"),
        other => panic!("expected Registration, got {other:?}"),
    }
}

// =============================================================================
// Refresh
// =============================================================================

#[tokio::test]
async fn refresh_rederives_profile_with_bearer_token() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    let mut updated = user_json();
    updated["name"] = serde_json::json!("Ana María");
    // Collaborator omits the photo; the persisted one must survive the merge
    updated.as_object_mut().unwrap().remove("profile_photo");

    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated))
        .mount(&harness.server)
        .await;

    harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    let refreshed = harness.session.refresh().await.unwrap();
    assert_eq!(refreshed.name, "Ana María");
    assert_eq!(refreshed.profile_photo.as_deref(), Some("ana.jpg"));

    // Re-persisted
    let persisted: UserSession = harness.storage.get(storage_keys::USER).unwrap();
    assert_eq!(persisted, refreshed);
}

#[tokio::test]
async fn refresh_failure_never_signs_out() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/profile"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&harness.server)
        .await;

    harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    // Soft-fail: the persisted session survives a collaborator failure
    let refreshed = harness.session.refresh().await.unwrap();
    assert_eq!(refreshed.name, "Ana");
    assert!(harness.session.is_authenticated());
    assert!(harness.storage.contains(storage_keys::USER));
}

// =============================================================================
// Cross-instance consistency
// =============================================================================

#[tokio::test]
async fn second_consumer_reloads_state_written_by_first() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    // A second "tab": separate managers over the same storage profile
    let other = TestHarness::over(harness.server, harness.storage.clone());
    assert!(!other.session.is_authenticated());

    harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    // The storage-changed signal is external; its handler calls reload()
    other.session.reload();
    assert!(other.session.is_authenticated());
    assert_eq!(other.session.current_user().unwrap().name, "Ana");
}

#[tokio::test]
async fn logout_is_idempotent_and_observable() {
    let harness = TestHarness::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": "tok-abc",
            "user": user_json(),
        })))
        .mount(&harness.server)
        .await;

    harness
        .session
        .login(credentials("ana@example.com", "pw"))
        .await
        .unwrap();

    harness.session.logout();
    harness.session.logout();

    assert!(!harness.session.is_authenticated());
    assert!(!harness.storage.contains(storage_keys::USER));
    assert!(!harness.storage.contains(storage_keys::TOKEN));
}
