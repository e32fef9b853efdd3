//! Login and registration call chains against the stub auth endpoint.

use std::sync::Arc;

use serde_json::json;

use doorstep_integration_tests::{CannedResponse, StubApi, test_config};
use doorstep_storefront::error::{AppError, NoticeKind};
use doorstep_storefront::services::auth::{AuthError, RegisterOutcome};
use doorstep_storefront::session::MemoryTokenStore;
use doorstep_storefront::state::AppState;

async fn state_with(api: &StubApi) -> AppState {
    AppState::with_token_store(
        test_config(&api.base_url()),
        Arc::new(MemoryTokenStore::new()),
    )
    .expect("build state")
}

#[tokio::test]
async fn login_success_authenticates_session() {
    let api = StubApi::spawn(vec![CannedResponse::post(
        "/auth/login",
        200,
        json!({ "accessToken": "issued-token" }),
    )])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    state.auth().login("emilys", "emilyspass").await.expect("login");
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn login_accepts_token_field_alias() {
    let api = StubApi::spawn(vec![CannedResponse::post(
        "/auth/login",
        200,
        json!({ "token": "issued-token" }),
    )])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    state.auth().login("emilys", "emilyspass").await.expect("login");
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn login_rejection_surfaces_server_message() {
    let api = StubApi::spawn(vec![CannedResponse::post(
        "/auth/login",
        400,
        json!({ "message": "Invalid credentials" }),
    )])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    let err = state
        .auth()
        .login("emilys", "wrong")
        .await
        .expect_err("login must fail");
    assert!(matches!(
        &err,
        AuthError::Rejected { message: Some(m) } if m == "Invalid credentials"
    ));

    // At the action boundary this becomes a user-visible notice.
    let notice = AppError::from(err).into_notice();
    assert_eq!(notice.kind, NoticeKind::Auth);
    assert_eq!(notice.message, "Invalid credentials");
    assert!(!state.session().is_authenticated());
}

#[tokio::test]
async fn login_with_blank_fields_is_rejected_locally() {
    let api = StubApi::spawn(vec![]).await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    let err = state
        .auth()
        .login("  ", "password")
        .await
        .expect_err("validation must fail");
    assert!(matches!(err, AuthError::MissingCredentials));

    let notice = AppError::from(err).into_notice();
    assert_eq!(notice.kind, NoticeKind::Validation);
}

#[tokio::test]
async fn registration_chains_into_login() {
    let api = StubApi::spawn(vec![
        CannedResponse::post("/users/add", 200, json!({ "id": 101 })),
        CannedResponse::post("/auth/login", 200, json!({ "accessToken": "fresh-token" })),
    ])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    let outcome = state
        .auth()
        .register("newuser", "new@example.com", "hunter22")
        .await
        .expect("register");
    assert_eq!(outcome, RegisterOutcome::LoggedIn);
    assert!(state.session().is_authenticated());
}

#[tokio::test]
async fn registration_with_failing_login_asks_for_manual_login() {
    let api = StubApi::spawn(vec![
        CannedResponse::post("/users/add", 200, json!({ "id": 102 })),
        CannedResponse::post("/auth/login", 400, json!({ "message": "Invalid credentials" })),
    ])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    let outcome = state
        .auth()
        .register("newuser", "new@example.com", "hunter22")
        .await
        .expect("registration itself succeeds");
    assert_eq!(outcome, RegisterOutcome::RegisteredNeedsLogin);
    assert!(!state.session().is_authenticated());
}

#[tokio::test]
async fn registration_validates_locally_before_any_request() {
    let api = StubApi::spawn(vec![]).await;
    let state = state_with(&api).await;
    state.navigation().start().await;
    let auth = state.auth();

    assert!(matches!(
        auth.register("", "new@example.com", "hunter22").await,
        Err(AuthError::MissingFields)
    ));
    assert!(matches!(
        auth.register("newuser", "not-an-email", "hunter22").await,
        Err(AuthError::InvalidEmail(_))
    ));
    assert!(matches!(
        auth.register("newuser", "new@example.com", "short").await,
        Err(AuthError::WeakPassword { min: 6 })
    ));
}

#[tokio::test]
async fn registration_rejection_surfaces_server_message() {
    let api = StubApi::spawn(vec![CannedResponse::post(
        "/users/add",
        400,
        json!({ "message": "Username already taken" }),
    )])
    .await;
    let state = state_with(&api).await;
    state.navigation().start().await;

    let err = state
        .auth()
        .register("taken", "new@example.com", "hunter22")
        .await
        .expect_err("registration must fail");
    assert!(matches!(
        err,
        AuthError::Rejected { message: Some(m) } if m == "Username already taken"
    ));
}

#[tokio::test]
async fn unreachable_store_keeps_previous_catalog() {
    // Reserve a port, then close it so connections are refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let dead_addr = listener.local_addr().expect("addr");
    drop(listener);

    let state = AppState::with_token_store(
        test_config(&format!("http://{dead_addr}")),
        Arc::new(MemoryTokenStore::with_token("tok")),
    )
    .expect("build state");
    state.navigation().start().await;

    let err = state.load_catalog().await.expect_err("fetch must fail");
    let notice = err.into_notice();
    assert_eq!(notice.kind, NoticeKind::Fetch);

    // Previous (empty) state is retained, not corrupted.
    assert!(state.catalog().products().is_empty());
    assert!(state.catalog().filtered().is_empty());
}
