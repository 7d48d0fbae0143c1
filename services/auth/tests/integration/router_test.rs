use std::sync::Arc;

use axum_test::TestServer;
use sea_orm::DatabaseConnection;
use serde_json::json;

use vendo_auth::infra::email::EmailClient;
use vendo_auth::infra::google::GoogleIdentityProvider;
use vendo_auth::router::build_router;
use vendo_auth::state::AppState;
use vendo_auth::usecase::roles::DefaultRoleCache;

use crate::helpers::test_settings;

fn test_server() -> TestServer {
    let state = AppState {
        db: DatabaseConnection::Disconnected,
        email: EmailClient::from_config(None, String::new()),
        google: GoogleIdentityProvider::new(
            "client-id".to_owned(),
            "client-secret".to_owned(),
            "http://localhost/callback".to_owned(),
        ),
        token_settings: test_settings(),
        totp_issuer: "Vendo".to_owned(),
        otp_ttl_secs: 300,
        default_role: Arc::new(DefaultRoleCache::new()),
    };
    TestServer::new(build_router(state)).unwrap()
}

#[tokio::test]
async fn healthz_responds_ok() {
    let server = test_server();
    let response = server.get("/healthz").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn refresh_with_garbage_token_is_a_plain_unauthorized() {
    let server = test_server();
    let response = server
        .post("/auth/refresh-token")
        .json(&json!({ "refresh_token": "garbage" }))
        .await;

    // Verification fails before the store is consulted, and the boundary
    // reveals nothing beyond UNAUTHORIZED.
    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
    assert!(body.get("field").is_none());
}

#[tokio::test]
async fn logout_with_garbage_token_is_a_plain_unauthorized() {
    let server = test_server();
    let response = server
        .post("/auth/logout")
        .json(&json!({ "refresh_token": "garbage" }))
        .await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn two_factor_setup_requires_a_bearer_token() {
    let server = test_server();
    let response = server.post("/auth/2fa/setup").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn otp_request_with_unknown_purpose_is_rejected_at_the_boundary() {
    let server = test_server();
    let response = server
        .post("/auth/otp")
        .json(&json!({ "email": "a@x.com", "purpose": "NOT_A_PURPOSE" }))
        .await;
    assert!(response.status_code().is_client_error());
}
