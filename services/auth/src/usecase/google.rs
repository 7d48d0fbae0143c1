use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::password::hash_password;
use crate::domain::repository::{
    DeviceRepository, IdentityProvider, RefreshTokenRepository, RoleRepository, UserRepository,
};
use crate::domain::types::{User, UserStatus};
use crate::error::AuthServiceError;
use crate::usecase::roles::DefaultRoleCache;
use crate::usecase::session::{SessionRegistry, SessionTokens};

pub struct FederatedLoginInput {
    pub code: String,
    pub user_agent: String,
    pub ip: String,
}

/// Federated login: exchange a provider authorization code for a verified
/// email, find-or-create the account, then mint a session exactly like the
/// post-password portion of the regular login. No second factor on this path.
pub struct GoogleLoginUseCase<I, U, Ro, D, R>
where
    I: IdentityProvider,
    U: UserRepository,
    Ro: RoleRepository,
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    pub identity: I,
    pub users: U,
    pub roles: Ro,
    pub sessions: SessionRegistry<D, R>,
    pub default_role: Arc<DefaultRoleCache>,
}

impl<I, U, Ro, D, R> GoogleLoginUseCase<I, U, Ro, D, R>
where
    I: IdentityProvider,
    U: UserRepository,
    Ro: RoleRepository,
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    pub async fn execute(
        &self,
        input: FederatedLoginInput,
    ) -> Result<SessionTokens, AuthServiceError> {
        let identity = self.identity.exchange_code(&input.code).await?;

        let (user, role) = match self.users.find_by_email_with_role(&identity.email).await? {
            Some(pair) => pair,
            None => {
                // First sight of this address: provision an account with an
                // unusable random password so the password path stays closed.
                let role = self.default_role.get_or_load(&self.roles).await?;
                let password_hash = hash_password(&Uuid::new_v4().to_string()).map_err(|e| {
                    AuthServiceError::Internal(anyhow::anyhow!("hash password: {e}"))
                })?;
                let now = Utc::now();
                let user = User {
                    id: Uuid::now_v7(),
                    email: identity.email.clone(),
                    name: identity.name.clone(),
                    phone_number: String::new(),
                    avatar: identity.avatar.clone(),
                    password_hash,
                    totp_secret: None,
                    role_id: role.id,
                    status: UserStatus::Active,
                    created_at: now,
                    updated_at: now,
                };
                self.users.create(&user).await?;
                (user, role)
            }
        };

        let device = self
            .sessions
            .register_device(user.id, &input.user_agent, &input.ip)
            .await?;
        self.sessions
            .issue_session(user.id, device.id, role.id, &role.name)
            .await
    }
}
