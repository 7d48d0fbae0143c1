use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::password::hash_password;
use crate::domain::repository::{RoleRepository, UserRepository, VerificationCodeRepository};
use crate::domain::types::{CodePurpose, PublicUser, User, UserStatus};
use crate::error::AuthServiceError;
use crate::usecase::otp::consume_code;
use crate::usecase::roles::DefaultRoleCache;

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub phone_number: String,
    pub code: String,
}

pub struct RegisterUseCase<U, R, V>
where
    U: UserRepository,
    R: RoleRepository,
    V: VerificationCodeRepository,
{
    pub users: U,
    pub roles: R,
    pub codes: V,
    pub default_role: Arc<DefaultRoleCache>,
}

impl<U, R, V> RegisterUseCase<U, R, V>
where
    U: UserRepository,
    R: RoleRepository,
    V: VerificationCodeRepository,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<PublicUser, AuthServiceError> {
        if input.password != input.confirm_password {
            return Err(AuthServiceError::PasswordMismatch);
        }

        consume_code(&self.codes, &input.email, CodePurpose::Register, &input.code).await?;

        let role = self.default_role.get_or_load(&self.roles).await?;
        let password_hash = hash_password(&input.password)
            .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("hash password: {e}")))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: input.email,
            name: input.name,
            phone_number: input.phone_number,
            avatar: None,
            password_hash,
            totp_secret: None,
            role_id: role.id,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        // The consume above does not preclude a concurrent registration of the
        // same address; the unique-email violation inside `create` is the
        // authoritative guard and surfaces as `EmailAlreadyExists`.
        self.users.create(&user).await?;

        Ok(user.into())
    }
}
