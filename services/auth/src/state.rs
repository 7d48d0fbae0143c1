use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbDeviceRepository, DbRefreshTokenRepository, DbRoleRepository, DbUserRepository,
    DbVerificationCodeRepository,
};
use crate::infra::email::EmailClient;
use crate::infra::google::GoogleIdentityProvider;
use crate::usecase::roles::DefaultRoleCache;
use crate::usecase::session::SessionRegistry;
use crate::usecase::token::TokenSettings;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub email: EmailClient,
    pub google: GoogleIdentityProvider,
    pub token_settings: TokenSettings,
    pub totp_issuer: String,
    pub otp_ttl_secs: i64,
    pub default_role: Arc<DefaultRoleCache>,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn role_repo(&self) -> DbRoleRepository {
        DbRoleRepository {
            db: self.db.clone(),
        }
    }

    pub fn verification_code_repo(&self) -> DbVerificationCodeRepository {
        DbVerificationCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn device_repo(&self) -> DbDeviceRepository {
        DbDeviceRepository {
            db: self.db.clone(),
        }
    }

    pub fn refresh_token_repo(&self) -> DbRefreshTokenRepository {
        DbRefreshTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn session_registry(&self) -> SessionRegistry<DbDeviceRepository, DbRefreshTokenRepository> {
        SessionRegistry {
            devices: self.device_repo(),
            refresh_tokens: self.refresh_token_repo(),
            settings: self.token_settings.clone(),
        }
    }
}
