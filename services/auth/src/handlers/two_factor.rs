use axum::{Json, extract::State, http::HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthServiceError;
use crate::handlers::bearer_token;
use crate::state::AppState;
use crate::usecase::token::validate_access_token;
use crate::usecase::two_factor::{
    DisableTwoFactorInput, DisableTwoFactorUseCase, SetupTwoFactorUseCase,
};

fn caller_id(headers: &HeaderMap, state: &AppState) -> Result<Uuid, AuthServiceError> {
    let token = bearer_token(headers)?;
    let claims = validate_access_token(token, &state.token_settings)?;
    claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthServiceError::Unauthorized)
}

// ── POST /auth/2fa/setup ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SetupTwoFactorResponse {
    pub secret: String,
    pub provisioning_uri: String,
}

pub async fn setup_two_factor(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SetupTwoFactorResponse>, AuthServiceError> {
    let user_id = caller_id(&headers, &state)?;
    let usecase = SetupTwoFactorUseCase {
        users: state.user_repo(),
        issuer: state.totp_issuer.clone(),
    };
    let out = usecase.execute(user_id).await?;
    Ok(Json(SetupTwoFactorResponse {
        secret: out.secret,
        provisioning_uri: out.provisioning_uri,
    }))
}

// ── POST /auth/2fa/disable ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DisableTwoFactorRequest {
    pub totp_code: Option<String>,
    pub otp_code: Option<String>,
}

#[derive(Serialize)]
pub struct DisableTwoFactorResponse {
    pub message: &'static str,
}

pub async fn disable_two_factor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<DisableTwoFactorRequest>,
) -> Result<Json<DisableTwoFactorResponse>, AuthServiceError> {
    let user_id = caller_id(&headers, &state)?;
    let usecase = DisableTwoFactorUseCase {
        users: state.user_repo(),
        codes: state.verification_code_repo(),
        issuer: state.totp_issuer.clone(),
    };
    usecase
        .execute(
            user_id,
            DisableTwoFactorInput {
                totp_code: body.totp_code,
                otp_code: body.otp_code,
            },
        )
        .await?;
    Ok(Json(DisableTwoFactorResponse {
        message: "two-factor auth disabled",
    }))
}
