use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::AuthServiceError;
use crate::handlers::client_context;
use crate::handlers::session::TokenPairResponse;
use crate::state::AppState;
use crate::usecase::google::{FederatedLoginInput, GoogleLoginUseCase};

/// Device-binding context threaded through the provider round-trip as an
/// opaque state blob.
#[derive(Serialize, Deserialize)]
struct OauthState {
    user_agent: String,
    ip: String,
}

// ── GET /auth/google/url ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AuthorizationUrlResponse {
    pub url: String,
}

pub async fn google_authorization_url(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthorizationUrlResponse>, AuthServiceError> {
    let (user_agent, ip) = client_context(&headers);
    let blob = serde_json::to_vec(&OauthState { user_agent, ip })
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
    let url = state.google.authorization_url(&BASE64.encode(blob));
    Ok(Json(AuthorizationUrlResponse { url }))
}

// ── GET /auth/google/callback ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GoogleCallbackQuery {
    pub code: String,
    pub state: Option<String>,
}

pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<GoogleCallbackQuery>,
) -> Result<Json<TokenPairResponse>, AuthServiceError> {
    // An unreadable state blob falls back to an unbound context rather than
    // failing the login.
    let (user_agent, ip) = query
        .state
        .as_deref()
        .and_then(|s| BASE64.decode(s).ok())
        .and_then(|bytes| serde_json::from_slice::<OauthState>(&bytes).ok())
        .map(|s| (s.user_agent, s.ip))
        .unwrap_or_else(|| ("unknown".to_owned(), "unknown".to_owned()));

    let usecase = GoogleLoginUseCase {
        identity: state.google.clone(),
        users: state.user_repo(),
        roles: state.role_repo(),
        sessions: state.session_registry(),
        default_role: state.default_role.clone(),
    };
    let tokens = usecase
        .execute(FederatedLoginInput {
            code: query.code,
            user_agent,
            ip,
        })
        .await?;
    Ok(Json(TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}
