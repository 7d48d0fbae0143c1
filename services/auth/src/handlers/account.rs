use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::types::CodePurpose;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase};
use crate::usecase::password_reset::{ForgotPasswordInput, ForgotPasswordUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub phone_number: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub avatar: Option<String>,
    pub role_id: String,
    pub status: String,
    #[serde(serialize_with = "vendo_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "vendo_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AuthServiceError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        roles: state.role_repo(),
        codes: state.verification_code_repo(),
        default_role: state.default_role.clone(),
    };
    let user = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            confirm_password: body.confirm_password,
            name: body.name,
            phone_number: body.phone_number,
            code: body.code,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            phone_number: user.phone_number,
            avatar: user.avatar,
            role_id: user.role_id.to_string(),
            status: user.status.as_str().to_owned(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }),
    ))
}

// ── POST /auth/otp ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
    pub purpose: CodePurpose,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let usecase = RequestOtpUseCase {
        users: state.user_repo(),
        codes: state.verification_code_repo(),
        email: state.email.clone(),
        otp_ttl_secs: state.otp_ttl_secs,
    };
    usecase
        .execute(RequestOtpInput {
            email: body.email,
            purpose: body.purpose,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/forgot-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AuthServiceError> {
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        codes: state.verification_code_repo(),
    };
    usecase
        .execute(ForgotPasswordInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
            confirm_new_password: body.confirm_new_password,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "password updated",
    }))
}
