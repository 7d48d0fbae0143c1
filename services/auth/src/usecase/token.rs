use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::error::AuthServiceError;

/// Signing material and lifetimes for both token kinds. The two secrets are
/// independent so leaking one never compromises the other kind.
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub device_id: String,
    pub role_id: String,
    pub role_name: String,
    /// Fresh nonce per issue — two tokens minted for the same payload and
    /// expiry are never bit-identical.
    pub jti: String,
    pub exp: u64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub jti: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

pub fn sign_access_token(
    user_id: Uuid,
    device_id: Uuid,
    role_id: Uuid,
    role_name: &str,
    settings: &TokenSettings,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + settings.access_ttl_secs;
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        device_id: device_id.to_string(),
        role_id: role_id.to_string(),
        role_name: role_name.to_owned(),
        jti: Uuid::new_v4().to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.access_secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

pub fn sign_refresh_token(
    user_id: Uuid,
    settings: &TokenSettings,
) -> Result<(String, u64), AuthServiceError> {
    let exp = now_secs() + settings.refresh_ttl_secs;
    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
    )
    .map_err(|e| AuthServiceError::Internal(e.into()))?;
    Ok((token, exp))
}

fn validation() -> Validation {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

/// Validate an access token. Every failure mode — bad signature, expiry,
/// garbage input — collapses to `Unauthorized` so the boundary leaks nothing.
pub fn validate_access_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<AccessTokenClaims, AuthServiceError> {
    let data = decode::<AccessTokenClaims>(
        token,
        &DecodingKey::from_secret(settings.access_secret.as_bytes()),
        &validation(),
    )
    .map_err(|_| AuthServiceError::Unauthorized)?;
    Ok(data.claims)
}

/// Validate a refresh token. Same collapse-to-`Unauthorized` policy; the
/// returned `exp` is what the session registry persists on the record.
pub fn validate_refresh_token(
    token: &str,
    settings: &TokenSettings,
) -> Result<RefreshTokenClaims, AuthServiceError> {
    let data = decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(settings.refresh_secret.as_bytes()),
        &validation(),
    )
    .map_err(|_| AuthServiceError::Unauthorized)?;
    Ok(data.claims)
}
