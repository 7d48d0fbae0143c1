use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    sea_query::OnConflict,
};
use uuid::Uuid;

use vendo_auth_schema::{devices, refresh_tokens, roles, users, verification_codes};

use crate::domain::repository::{
    DeviceRepository, RefreshTokenRepository, RoleRepository, UserRepository,
    VerificationCodeRepository,
};
use crate::domain::types::{
    CodePurpose, Device, RefreshTokenRecord, Role, SessionContext, User, UserStatus,
    VerificationCode,
};
use crate::error::AuthServiceError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email_with_role(
        &self,
        email: &str,
    ) -> Result<Option<(User, Role)>, AuthServiceError> {
        let Some((user_model, role_model)) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .find_also_related(roles::Entity)
            .one(&self.db)
            .await
            .context("find user with role")?
        else {
            return Ok(None);
        };
        let role_model = role_model
            .ok_or_else(|| anyhow::anyhow!("user {} has no role row", user_model.id))?;
        Ok(Some((user_from_model(user_model)?, role_from_model(role_model))))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let result = users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            name: Set(user.name.clone()),
            phone_number: Set(user.phone_number.clone()),
            avatar: Set(user.avatar.clone()),
            password_hash: Set(user.password_hash.clone()),
            totp_secret: Set(user.totp_secret.clone()),
            role_id: Set(user.role_id),
            status: Set(user.status.as_str().to_owned()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            // The unique email index is the authoritative duplicate guard.
            Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                Err(AuthServiceError::EmailAlreadyExists)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create user").into()),
        }
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }

    async fn set_totp_secret(
        &self,
        id: Uuid,
        secret: Option<&str>,
    ) -> Result<(), AuthServiceError> {
        users::ActiveModel {
            id: Set(id),
            totp_secret: Set(secret.map(str::to_owned)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set totp secret")?;
        Ok(())
    }
}

fn user_from_model(model: users::Model) -> Result<User, AuthServiceError> {
    let status = UserStatus::parse(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown user status {:?}", model.status))?;
    Ok(User {
        id: model.id,
        email: model.email,
        name: model.name,
        phone_number: model.phone_number,
        avatar: model.avatar,
        password_hash: model.password_hash,
        totp_secret: model.totp_secret,
        role_id: model.role_id,
        status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Role repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRoleRepository {
    pub db: DatabaseConnection,
}

impl RoleRepository for DbRoleRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AuthServiceError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(role_from_model))
    }
}

fn role_from_model(model: roles::Model) -> Role {
    Role {
        id: model.id,
        name: model.name,
        description: model.description,
    }
}

// ── Verification code repository ─────────────────────────────────────────────

#[derive(Clone)]
pub struct DbVerificationCodeRepository {
    pub db: DatabaseConnection,
}

impl VerificationCodeRepository for DbVerificationCodeRepository {
    async fn upsert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        verification_codes::Entity::insert(verification_codes::ActiveModel {
            email: Set(code.email.clone()),
            purpose: Set(code.purpose.as_str().to_owned()),
            code: Set(code.code.clone()),
            expires_at: Set(code.expires_at),
            created_at: Set(code.created_at),
        })
        .on_conflict(
            // One live code per (email, purpose): re-requesting overwrites.
            OnConflict::columns([
                verification_codes::Column::Email,
                verification_codes::Column::Purpose,
            ])
            .update_columns([
                verification_codes::Column::Code,
                verification_codes::Column::ExpiresAt,
            ])
            .to_owned(),
        )
        .exec(&self.db)
        .await
        .context("upsert verification code")?;
        Ok(())
    }

    async fn find(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        let model = verification_codes::Entity::find_by_id((
            email.to_owned(),
            purpose.as_str().to_owned(),
        ))
        .one(&self.db)
        .await
        .context("find verification code")?;
        model.map(code_from_model).transpose()
    }

    async fn delete(&self, email: &str, purpose: CodePurpose) -> Result<(), AuthServiceError> {
        verification_codes::Entity::delete_many()
            .filter(verification_codes::Column::Email.eq(email))
            .filter(verification_codes::Column::Purpose.eq(purpose.as_str()))
            .exec(&self.db)
            .await
            .context("delete verification code")?;
        Ok(())
    }
}

fn code_from_model(model: verification_codes::Model) -> Result<VerificationCode, AuthServiceError> {
    let purpose = CodePurpose::parse(&model.purpose)
        .ok_or_else(|| anyhow::anyhow!("unknown code purpose {:?}", model.purpose))?;
    Ok(VerificationCode {
        email: model.email,
        purpose,
        code: model.code,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}

// ── Device repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDeviceRepository {
    pub db: DatabaseConnection,
}

impl DeviceRepository for DbDeviceRepository {
    async fn create(&self, device: &Device) -> Result<(), AuthServiceError> {
        devices::ActiveModel {
            id: Set(device.id),
            user_id: Set(device.user_id),
            user_agent: Set(device.user_agent.clone()),
            ip: Set(device.ip.clone()),
            last_active: Set(device.last_active),
            is_active: Set(device.is_active),
        }
        .insert(&self.db)
        .await
        .context("create device")?;
        Ok(())
    }

    async fn touch(&self, id: Uuid, user_agent: &str, ip: &str) -> Result<(), AuthServiceError> {
        devices::ActiveModel {
            id: Set(id),
            user_agent: Set(user_agent.to_owned()),
            ip: Set(ip.to_owned()),
            last_active: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch device")?;
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), AuthServiceError> {
        devices::ActiveModel {
            id: Set(id),
            is_active: Set(false),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("deactivate device")?;
        Ok(())
    }
}

// ── Refresh token repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRefreshTokenRepository {
    pub db: DatabaseConnection,
}

impl RefreshTokenRepository for DbRefreshTokenRepository {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        refresh_tokens::ActiveModel {
            token: Set(record.token.clone()),
            user_id: Set(record.user_id),
            device_id: Set(record.device_id),
            expires_at: Set(record.expires_at),
            created_at: Set(record.created_at),
        }
        .insert(&self.db)
        .await
        .context("create refresh token record")?;
        Ok(())
    }

    async fn find_with_context(
        &self,
        token: &str,
    ) -> Result<Option<SessionContext>, AuthServiceError> {
        let Some((record_model, user_model)) = refresh_tokens::Entity::find_by_id(token.to_owned())
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find refresh token record")?
        else {
            return Ok(None);
        };
        let user_model =
            user_model.ok_or_else(|| anyhow::anyhow!("refresh token row without user"))?;
        let role_model = roles::Entity::find_by_id(user_model.role_id)
            .one(&self.db)
            .await
            .context("find role for session")?
            .ok_or_else(|| anyhow::anyhow!("user {} has no role row", user_model.id))?;

        Ok(Some(SessionContext {
            record: RefreshTokenRecord {
                token: record_model.token,
                user_id: record_model.user_id,
                device_id: record_model.device_id,
                expires_at: record_model.expires_at,
                created_at: record_model.created_at,
            },
            user: user_from_model(user_model)?,
            role: role_from_model(role_model),
        }))
    }

    async fn delete(&self, token: &str) -> Result<bool, AuthServiceError> {
        // Single DELETE: under concurrent consumption of the same token the
        // database hands exactly one caller rows_affected == 1.
        let result = refresh_tokens::Entity::delete_many()
            .filter(refresh_tokens::Column::Token.eq(token))
            .exec(&self.db)
            .await
            .context("delete refresh token record")?;
        Ok(result.rows_affected > 0)
    }
}
