use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::handlers::client_context;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};

#[derive(Serialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub totp_code: Option<String>,
    pub otp_code: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<(StatusCode, Json<TokenPairResponse>), AuthServiceError> {
    let (user_agent, ip) = client_context(&headers);
    let usecase = LoginUseCase {
        users: state.user_repo(),
        codes: state.verification_code_repo(),
        sessions: state.session_registry(),
        totp_issuer: state.totp_issuer.clone(),
    };
    let tokens = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
            user_agent,
            ip,
            totp_code: body.totp_code,
            otp_code: body.otp_code,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(TokenPairResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }),
    ))
}

// ── POST /auth/refresh-token ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenPairResponse>, AuthServiceError> {
    let (user_agent, ip) = client_context(&headers);
    let tokens = state
        .session_registry()
        .rotate(&body.refresh_token, &user_agent, &ip)
        .await
        // Anything unrecognized collapses to Unauthorized on this path.
        .map_err(AuthServiceError::collapse_for_session_ops)?;
    Ok(Json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AuthServiceError> {
    state
        .session_registry()
        .revoke(&body.refresh_token)
        .await
        .map_err(AuthServiceError::collapse_for_session_ops)?;
    Ok(Json(LogoutResponse {
        message: "logged out",
    }))
}
