pub mod account;
pub mod google;
pub mod session;
pub mod two_factor;

use axum::http::{HeaderMap, header};

use crate::error::AuthServiceError;

/// Device-binding context, read once at the boundary and passed explicitly.
pub(crate) fn client_context(headers: &HeaderMap) -> (String, String) {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_owned();
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_owned();
    (user_agent, ip)
}

/// Access-token guard for operations that identify the caller by bearer token.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthServiceError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthServiceError::Unauthorized)
}
