#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    CodePurpose, Device, ExternalIdentity, RefreshTokenRecord, Role, SessionContext, User,
    VerificationCode,
};
use crate::error::AuthServiceError;

/// Repository for account rows.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError>;

    /// Find a user joined to their role, for flows that mint tokens.
    async fn find_by_email_with_role(
        &self,
        email: &str,
    ) -> Result<Option<(User, Role)>, AuthServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError>;

    /// Insert a new user. A duplicate email surfaces as `EmailAlreadyExists` —
    /// this, not any pre-check, is the authoritative guard against concurrent
    /// registration of the same address.
    async fn create(&self, user: &User) -> Result<(), AuthServiceError>;

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError>;

    /// Set or clear the TOTP secret. Present secret ⇔ 2FA enabled.
    async fn set_totp_secret(
        &self,
        id: Uuid,
        secret: Option<&str>,
    ) -> Result<(), AuthServiceError>;
}

/// Repository for seeded role rows.
pub trait RoleRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AuthServiceError>;
}

/// Repository for one-time email verification codes.
pub trait VerificationCodeRepository: Send + Sync {
    /// Upsert by (email, purpose): an existing row gets its code and expiry
    /// overwritten, never duplicated.
    async fn upsert(&self, code: &VerificationCode) -> Result<(), AuthServiceError>;

    async fn find(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<Option<VerificationCode>, AuthServiceError>;

    async fn delete(&self, email: &str, purpose: CodePurpose) -> Result<(), AuthServiceError>;
}

/// Repository for device rows.
pub trait DeviceRepository: Send + Sync {
    async fn create(&self, device: &Device) -> Result<(), AuthServiceError>;

    /// Update the binding context and bump `last_active` after a rotation.
    async fn touch(&self, id: Uuid, user_agent: &str, ip: &str) -> Result<(), AuthServiceError>;

    /// Flip `is_active` off. Devices are never deleted on logout.
    async fn deactivate(&self, id: Uuid) -> Result<(), AuthServiceError>;
}

/// Repository for refresh-token records. The session registry is the only
/// component that creates or deletes these rows.
pub trait RefreshTokenRepository: Send + Sync {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError>;

    async fn find_with_context(
        &self,
        token: &str,
    ) -> Result<Option<SessionContext>, AuthServiceError>;

    /// Atomic check-and-delete. `false` means the record was already gone.
    /// Two concurrent consumers of the same token race on this call; the
    /// database guarantees exactly one winner, with no in-process locking.
    async fn delete(&self, token: &str) -> Result<bool, AuthServiceError>;
}

/// Outbound delivery of verification codes. Implementations own the
/// transport; an `Err` surfaces as `OtpDeliveryFailed` at the orchestrator.
pub trait EmailPort: Send + Sync {
    async fn send_code(
        &self,
        email: &str,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<(), AuthServiceError>;
}

/// Exchange of a third-party authorization code for a verified identity.
pub trait IdentityProvider: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, AuthServiceError>;
}
