use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account status stored on the user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Active,
    Inactive,
    Blocked,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Blocked => "BLOCKED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(Self::Active),
            "INACTIVE" => Some(Self::Inactive),
            "BLOCKED" => Some(Self::Blocked),
            _ => None,
        }
    }
}

/// Full account row. `password_hash` and `totp_secret` never cross the
/// service boundary — outward views go through [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub avatar: Option<String>,
    pub password_hash: String,
    pub totp_secret: Option<String>,
    pub role_id: Uuid,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn two_factor_enabled(&self) -> bool {
        self.totp_secret.is_some()
    }
}

/// Credential-free projection of a user, safe to return to callers.
#[derive(Debug, Clone)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    pub avatar: Option<String>,
    pub role_id: Uuid,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone_number: user.phone_number,
            avatar: user.avatar,
            role_id: user.role_id,
            status: user.status,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

/// Role assigned to self-registered and federated accounts.
/// Role rows are seeded by the migration and immutable afterwards.
pub const DEFAULT_ROLE: &str = "Client";

/// Login context a session is bound to.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_agent: String,
    pub ip: String,
    pub last_active: DateTime<Utc>,
    pub is_active: bool,
}

/// Live refresh-token record. Deleted when consumed (rotation) or revoked
/// (logout); a cryptographically valid token with no record was already used.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub device_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A refresh-token record joined to its owning user and role.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub record: RefreshTokenRecord,
    pub user: User,
    pub role: Role,
}

/// What an email verification code gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodePurpose {
    Register,
    ForgotPassword,
    Login,
    #[serde(rename = "DISABLE_2FA")]
    Disable2fa,
}

impl CodePurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Register => "REGISTER",
            Self::ForgotPassword => "FORGOT_PASSWORD",
            Self::Login => "LOGIN",
            Self::Disable2fa => "DISABLE_2FA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "REGISTER" => Some(Self::Register),
            "FORGOT_PASSWORD" => Some(Self::ForgotPassword),
            "LOGIN" => Some(Self::Login),
            "DISABLE_2FA" => Some(Self::Disable2fa),
            _ => None,
        }
    }
}

/// One-time email code, keyed by (email, purpose).
#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub email: String,
    pub purpose: CodePurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Identity asserted by an external provider after authorization-code exchange.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}
