// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end flows through the `App` coordinator: login, the report
//! workflow against a failing and a healthy backend, the forced-logout
//! contract, and admin account management.

mod common;

use civicflow_client::config::Config;
use civicflow_client::error::ClientError;
use civicflow_client::middleware::SessionGuard;
use civicflow_client::models::{Account, IssueStatus, Location};
use civicflow_client::policy::Role;
use civicflow_client::report::FlowState;
use civicflow_client::services::{Backend, RegisterRequest};
use civicflow_client::session::Session;
use civicflow_client::storage::MemoryStore;
use civicflow_client::App;
use common::{exp_in, make_token, raw_issue, MockBackend};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const PICK: Location = Location {
    latitude: 22.3072,
    longitude: 73.1812,
};

/// App wired like production, with the mock backend behind the guard.
fn test_app(backend: Arc<MockBackend>) -> App {
    let session = Arc::new(Session::new(Box::new(MemoryStore::new())));
    let guarded: Arc<dyn Backend> = Arc::new(SessionGuard::new(backend, session.clone()));
    App::from_parts(Config::default(), session, guarded)
}

async fn sign_in(app: &App, backend: &MockBackend, email: &str, role: &str) {
    backend.grant_login(&make_token(email, Some(role), Some(exp_in(3600))));
    app.login(email, "hunter2").await.unwrap();
}

#[tokio::test]
async fn test_login_derives_profile_from_token() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(backend.clone());

    backend.grant_login(&make_token("o@city.gov", Some("OFFICIAL"), Some(exp_in(3600))));
    let profile = app.login("o@city.gov", "hunter2").await.unwrap();

    assert_eq!(profile.email, "o@city.gov");
    assert_eq!(profile.role, Role::Official);
    assert!(app.session().is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_is_inline_and_leaves_no_session() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(backend.clone());

    let err = app.login("o@city.gov", "wrong").await.unwrap_err();
    assert!(matches!(err, ClientError::AuthRejected(_)));
    assert!(!app.session().is_authenticated());
}

#[tokio::test]
async fn test_login_without_role_claim_defaults_to_citizen() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(backend.clone());

    backend.grant_login(&make_token("c@d.e", None, Some(exp_in(3600))));
    let profile = app.login("c@d.e", "hunter2").await.unwrap();
    assert_eq!(profile.role, Role::Citizen);
}

#[tokio::test]
async fn test_official_lifecycle_end_to_end() {
    let backend = Arc::new(MockBackend::with_issues(vec![raw_issue(1, "Pothole", "OPEN")]));
    let mut app = test_app(backend.clone());
    sign_in(&app, &backend, "o@city.gov", "OFFICIAL").await;

    app.refresh_issues().await.unwrap();
    assert_eq!(app.registry().issues().len(), 1);
    assert_eq!(app.registry().get(1).unwrap().title, "Pothole");

    app.update_issue_status(1, IssueStatus::InProgress)
        .await
        .unwrap();
    assert_eq!(app.registry().get(1).unwrap().status, IssueStatus::InProgress);

    // Backward transition must be rejected
    let err = app
        .update_issue_status(1, IssueStatus::Open)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::TransitionRejected(_)));
    assert_eq!(app.registry().get(1).unwrap().status, IssueStatus::InProgress);
}

#[tokio::test]
async fn test_report_flow_success_refreshes_registry() {
    let backend = Arc::new(MockBackend::new());
    let mut app = test_app(backend.clone());
    sign_in(&app, &backend, "c@d.e", "CITIZEN").await;
    app.refresh_issues().await.unwrap();
    assert!(app.registry().issues().is_empty());

    app.start_report().unwrap();
    assert!(app.map_click(PICK));
    app.set_report_title("Pothole");
    app.set_report_description("Deep pothole near the crossing");
    assert!(app.can_submit_report());

    let created = app.submit_report().await.unwrap();
    assert_eq!(created.status, IssueStatus::Open);
    assert_eq!(*app.flow(), FlowState::Idle);

    // New record is visible without an explicit refresh
    assert!(app.registry().get(created.id).is_some());

    let submitted = backend.submitted.lock().unwrap();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].location, PICK);
}

#[tokio::test]
async fn test_report_flow_failure_retains_draft_for_retry() {
    let backend = Arc::new(MockBackend::new());
    let mut app = test_app(backend.clone());
    sign_in(&app, &backend, "c@d.e", "CITIZEN").await;

    app.start_report().unwrap();
    app.map_click(PICK);
    app.set_report_title("Pothole");
    app.set_report_description("Deep pothole near the crossing");

    backend.fail_submit.store(true, Ordering::SeqCst);
    let err = app.submit_report().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));

    // Draft survives the failure byte for byte
    match app.flow() {
        FlowState::Failed { draft, .. } => {
            assert_eq!(draft.title, "Pothole");
            assert_eq!(draft.description, "Deep pothole near the crossing");
            assert_eq!(draft.location, PICK);
        }
        other => panic!("expected Failed, got {:?}", other),
    }

    // Retry without re-entering anything
    backend.fail_submit.store(false, Ordering::SeqCst);
    assert!(app.resume_report());
    app.submit_report().await.unwrap();
    assert_eq!(*app.flow(), FlowState::Idle);
}

#[tokio::test]
async fn test_click_while_idle_never_creates_a_draft() {
    let backend = Arc::new(MockBackend::new());
    let mut app = test_app(backend.clone());
    sign_in(&app, &backend, "c@d.e", "CITIZEN").await;

    assert!(!app.map_click(PICK));
    assert_eq!(*app.flow(), FlowState::Idle);
}

#[tokio::test]
async fn test_forced_logout_on_expired_credential() {
    let backend = Arc::new(MockBackend::with_issues(vec![raw_issue(1, "Pothole", "OPEN")]));
    let mut app = test_app(backend.clone());
    sign_in(&app, &backend, "o@city.gov", "OFFICIAL").await;
    assert!(app.session().is_authenticated());

    // Backend starts answering 401 (token revoked/expired server-side)
    backend.unauthorized.store(true, Ordering::SeqCst);

    let err = app.refresh_issues().await.unwrap_err();
    assert!(matches!(err, ClientError::AuthExpired));

    // Cross-cutting contract: session fully cleared, not just the error
    assert!(!app.session().is_authenticated());
    assert!(app.session().token().is_none());
}

#[tokio::test]
async fn test_register_requires_admin_token_for_elevated_roles() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(backend.clone());

    let err = app
        .register(RegisterRequest {
            email: "o@city.gov".to_string(),
            password: "hunter2".to_string(),
            role: Role::Official,
            department: Some("Roads".to_string()),
            admin_token: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::AuthRejected(_)));
    assert!(backend.registered.lock().unwrap().is_empty());

    app.register(RegisterRequest {
        email: "c@d.e".to_string(),
        password: "hunter2".to_string(),
        role: Role::Citizen,
        department: None,
        admin_token: None,
    })
    .await
    .unwrap();
    assert_eq!(backend.registered.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_account_management() {
    let backend = Arc::new(MockBackend::new());
    *backend.accounts.lock().unwrap() = vec![
        serde_json::json!({"id": 1, "email": "c@d.e", "role": "CITIZEN"}),
        serde_json::json!({"id": 2, "email": "o@city.gov", "role": "OFFICIAL", "department": "Roads"}),
        serde_json::json!({"id": 3, "email": "root@city.gov", "role": "ADMIN"}),
        serde_json::json!({"id": "bad", "email": 42}),
    ];
    let app = test_app(backend.clone());
    sign_in(&app, &backend, "root@city.gov", "ADMIN").await;

    let accounts = app.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 3); // malformed record excluded

    let citizen = accounts.iter().find(|a| a.role == Role::Citizen).unwrap();
    app.delete_account(citizen).await.unwrap();
    assert_eq!(*backend.deleted.lock().unwrap(), vec![1]);

    // Admin accounts are protected, even from admins
    let admin = accounts.iter().find(|a| a.role == Role::Admin).unwrap();
    let err = app.delete_account(admin).await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(*backend.deleted.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_non_admin_cannot_reach_admin_endpoints() {
    let backend = Arc::new(MockBackend::new());
    let app = test_app(backend.clone());
    sign_in(&app, &backend, "o@city.gov", "OFFICIAL").await;

    let err = app.list_accounts().await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));

    let err = app
        .delete_account(&Account {
            id: 1,
            email: "c@d.e".to_string(),
            role: Role::Citizen,
            department: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert!(backend.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unauthenticated_intents_are_refused() {
    let backend = Arc::new(MockBackend::new());
    let mut app = test_app(backend);

    assert!(matches!(
        app.refresh_issues().await.unwrap_err(),
        ClientError::Forbidden(_)
    ));
    assert!(matches!(
        app.start_report().unwrap_err(),
        ClientError::Forbidden(_)
    ));
}
