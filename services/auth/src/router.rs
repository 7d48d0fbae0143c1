use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use vendo_core::health::healthz;
use vendo_core::middleware::request_id_layer;

use crate::handlers::{
    account::{forgot_password, register, send_otp},
    google::{google_authorization_url, google_callback},
    session::{login, logout, refresh_token},
    two_factor::{disable_two_factor, setup_two_factor},
};
use crate::state::AppState;

/// Readiness: the service is ready when the database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account
        .route("/auth/register", post(register))
        .route("/auth/otp", post(send_otp))
        .route("/auth/forgot-password", post(forgot_password))
        // Session
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/logout", post(logout))
        // Two-factor
        .route("/auth/2fa/setup", post(setup_two_factor))
        .route("/auth/2fa/disable", post(disable_two_factor))
        // Federated login
        .route("/auth/google/url", get(google_authorization_url))
        .route("/auth/google/callback", get(google_callback))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
