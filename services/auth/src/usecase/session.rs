use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::repository::{DeviceRepository, RefreshTokenRepository};
use crate::domain::types::{Device, RefreshTokenRecord, SessionContext};
use crate::error::AuthServiceError;
use crate::usecase::token::{
    TokenSettings, sign_access_token, sign_refresh_token, validate_refresh_token,
};

/// A freshly minted access/refresh pair.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Owns devices and refresh-token records, including the single-use rotation
/// invariant. No other component creates or deletes refresh-token rows.
pub struct SessionRegistry<D, R>
where
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    pub devices: D,
    pub refresh_tokens: R,
    pub settings: TokenSettings,
}

impl<D, R> SessionRegistry<D, R>
where
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    /// Always creates a fresh device row — no dedup across user_agent/ip.
    pub async fn register_device(
        &self,
        user_id: Uuid,
        user_agent: &str,
        ip: &str,
    ) -> Result<Device, AuthServiceError> {
        let device = Device {
            id: Uuid::now_v7(),
            user_id,
            user_agent: user_agent.to_owned(),
            ip: ip.to_owned(),
            last_active: Utc::now(),
            is_active: true,
        };
        self.devices.create(&device).await?;
        Ok(device)
    }

    /// Sign both tokens, then persist the refresh record with the expiry
    /// decoded from the signed token itself — stored, not inferred, so later
    /// secret or TTL changes never rewrite an issued expiry.
    pub async fn issue_session(
        &self,
        user_id: Uuid,
        device_id: Uuid,
        role_id: Uuid,
        role_name: &str,
    ) -> Result<SessionTokens, AuthServiceError> {
        let (access_token, _) =
            sign_access_token(user_id, device_id, role_id, role_name, &self.settings)?;
        let (refresh_token, _) = sign_refresh_token(user_id, &self.settings)?;

        let claims = validate_refresh_token(&refresh_token, &self.settings)?;
        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| AuthServiceError::Internal(anyhow::anyhow!("refresh exp out of range")))?;

        self.refresh_tokens
            .create(&RefreshTokenRecord {
                token: refresh_token.clone(),
                user_id,
                device_id,
                expires_at,
                created_at: Utc::now(),
            })
            .await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Consume a refresh token and issue a replacement pair.
    ///
    /// Verification strictly precedes any mutation. The atomic delete is the
    /// single-use gate: of two concurrent rotations with the same token, the
    /// database lets exactly one delete succeed; the loser surfaces
    /// `RefreshTokenRevoked` and mints nothing. After the gate, the device
    /// touch and the new session run concurrently and both must land before
    /// the new tokens are returned.
    pub async fn rotate(
        &self,
        refresh_token: &str,
        user_agent: &str,
        ip: &str,
    ) -> Result<SessionTokens, AuthServiceError> {
        validate_refresh_token(refresh_token, &self.settings)?;

        let SessionContext { record, user, role } = self
            .refresh_tokens
            .find_with_context(refresh_token)
            .await?
            .ok_or(AuthServiceError::RefreshTokenRevoked)?;

        if !self.refresh_tokens.delete(refresh_token).await? {
            // Consumed between lookup and delete by a concurrent rotation.
            return Err(AuthServiceError::RefreshTokenRevoked);
        }

        let (_, tokens) = tokio::try_join!(
            self.devices.touch(record.device_id, user_agent, ip),
            self.issue_session(user.id, record.device_id, role.id, &role.name),
        )?;
        Ok(tokens)
    }

    /// Consume a refresh token without replacement and deactivate its device.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthServiceError> {
        validate_refresh_token(refresh_token, &self.settings)?;

        let ctx = self
            .refresh_tokens
            .find_with_context(refresh_token)
            .await?
            .ok_or(AuthServiceError::RefreshTokenRevoked)?;

        if !self.refresh_tokens.delete(refresh_token).await? {
            return Err(AuthServiceError::RefreshTokenRevoked);
        }

        self.devices.deactivate(ctx.record.device_id).await
    }
}
