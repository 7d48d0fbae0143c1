use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use vendo_auth::domain::password::hash_password;
use vendo_auth::domain::repository::{
    DeviceRepository, RefreshTokenRepository, UserRepository, VerificationCodeRepository,
};
use vendo_auth::domain::types::{
    CodePurpose, Device, RefreshTokenRecord, Role, SessionContext, User, UserStatus,
    VerificationCode,
};
use vendo_auth::error::AuthServiceError;
use vendo_auth::usecase::session::SessionRegistry;
use vendo_auth::usecase::token::TokenSettings;

pub const TEST_ISSUER: &str = "Vendo";

pub fn test_settings() -> TokenSettings {
    TokenSettings {
        access_secret: "access-secret-for-integration-tests".to_owned(),
        refresh_secret: "refresh-secret-for-integration-tests".to_owned(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 60 * 60 * 24 * 30,
    }
}

pub fn test_role() -> Role {
    Role {
        id: Uuid::now_v7(),
        name: "Client".to_owned(),
        description: "Default role for registered accounts".to_owned(),
    }
}

/// A user whose password is "Passw0rd!" (really hashed, so login verifies).
pub fn test_user(role_id: Uuid) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        email: "a@x.com".to_owned(),
        name: "A".to_owned(),
        phone_number: "0123456789".to_owned(),
        avatar: None,
        password_hash: hash_password("Passw0rd!").unwrap(),
        totp_secret: None,
        role_id,
        status: UserStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn live_code(email: &str, purpose: CodePurpose, code: &str) -> VerificationCode {
    let now = Utc::now();
    VerificationCode {
        email: email.to_owned(),
        purpose,
        code: code.to_owned(),
        expires_at: now + Duration::seconds(300),
        created_at: now,
    }
}

// ── MockUserRepo ─────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
    pub roles: Arc<Vec<Role>>,
}

impl MockUserRepo {
    pub fn new(users: Vec<User>, roles: Vec<Role>) -> Self {
        Self {
            users: Arc::new(Mutex::new(users)),
            roles: Arc::new(roles),
        }
    }
}

impl UserRepository for MockUserRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_email_with_role(
        &self,
        email: &str,
    ) -> Result<Option<(User, Role)>, AuthServiceError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };
        let role = self
            .roles
            .iter()
            .find(|r| r.id == user.role_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("user without role row"))?;
        Ok(Some((user, role)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthServiceError::EmailAlreadyExists);
        }
        users.push(user.clone());
        Ok(())
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("no such user"))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn set_totp_secret(
        &self,
        id: Uuid,
        secret: Option<&str>,
    ) -> Result<(), AuthServiceError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("no such user"))?;
        user.totp_secret = secret.map(str::to_owned);
        Ok(())
    }
}

// ── MockCodeRepo ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockCodeRepo {
    pub rows: Arc<Mutex<Vec<VerificationCode>>>,
}

impl VerificationCodeRepository for MockCodeRepo {
    async fn upsert(&self, code: &VerificationCode) -> Result<(), AuthServiceError> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|c| !(c.email == code.email && c.purpose == code.purpose));
        rows.push(code.clone());
        Ok(())
    }

    async fn find(
        &self,
        email: &str,
        purpose: CodePurpose,
    ) -> Result<Option<VerificationCode>, AuthServiceError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email && c.purpose == purpose)
            .cloned())
    }

    async fn delete(&self, email: &str, purpose: CodePurpose) -> Result<(), AuthServiceError> {
        self.rows
            .lock()
            .unwrap()
            .retain(|c| !(c.email == email && c.purpose == purpose));
        Ok(())
    }
}

// ── MockDeviceRepo ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockDeviceRepo {
    pub devices: Arc<Mutex<Vec<Device>>>,
}

impl DeviceRepository for MockDeviceRepo {
    async fn create(&self, device: &Device) -> Result<(), AuthServiceError> {
        self.devices.lock().unwrap().push(device.clone());
        Ok(())
    }

    async fn touch(&self, id: Uuid, user_agent: &str, ip: &str) -> Result<(), AuthServiceError> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| anyhow::anyhow!("no such device"))?;
        device.user_agent = user_agent.to_owned();
        device.ip = ip.to_owned();
        device.last_active = Utc::now();
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> Result<(), AuthServiceError> {
        let mut devices = self.devices.lock().unwrap();
        let device = devices
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| anyhow::anyhow!("no such device"))?;
        device.is_active = false;
        Ok(())
    }
}

// ── MockRefreshTokenRepo ─────────────────────────────────────────────────────

/// Backs `find_with_context` with the same user list the user repo shares.
#[derive(Clone)]
pub struct MockRefreshTokenRepo {
    pub records: Arc<Mutex<Vec<RefreshTokenRecord>>>,
    pub users: Arc<Mutex<Vec<User>>>,
    pub roles: Arc<Vec<Role>>,
}

impl MockRefreshTokenRepo {
    pub fn new(users: &MockUserRepo) -> Self {
        Self {
            records: Arc::new(Mutex::new(vec![])),
            users: Arc::clone(&users.users),
            roles: Arc::clone(&users.roles),
        }
    }
}

impl RefreshTokenRepository for MockRefreshTokenRepo {
    async fn create(&self, record: &RefreshTokenRecord) -> Result<(), AuthServiceError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn find_with_context(
        &self,
        token: &str,
    ) -> Result<Option<SessionContext>, AuthServiceError> {
        let Some(record) = self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.token == token)
            .cloned()
        else {
            return Ok(None);
        };
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == record.user_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("record without user"))?;
        let role = self
            .roles
            .iter()
            .find(|r| r.id == user.role_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("user without role row"))?;
        Ok(Some(SessionContext { record, user, role }))
    }

    async fn delete(&self, token: &str) -> Result<bool, AuthServiceError> {
        // Single critical section: of two concurrent deletes for one token,
        // exactly one observes the record.
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.token != token);
        Ok(records.len() < before)
    }
}

// ── Wiring ───────────────────────────────────────────────────────────────────

pub struct TestWorld {
    pub users: MockUserRepo,
    pub codes: MockCodeRepo,
    pub devices: MockDeviceRepo,
    pub refresh_tokens: MockRefreshTokenRepo,
    pub role: Role,
}

impl TestWorld {
    pub fn with_user(mutate: impl FnOnce(&mut User)) -> (Self, User) {
        let role = test_role();
        let mut user = test_user(role.id);
        mutate(&mut user);
        let users = MockUserRepo::new(vec![user.clone()], vec![role.clone()]);
        let refresh_tokens = MockRefreshTokenRepo::new(&users);
        (
            Self {
                users,
                codes: MockCodeRepo::default(),
                devices: MockDeviceRepo::default(),
                refresh_tokens,
                role,
            },
            user,
        )
    }

    pub fn session_registry(&self) -> SessionRegistry<MockDeviceRepo, MockRefreshTokenRepo> {
        SessionRegistry {
            devices: self.devices.clone(),
            refresh_tokens: self.refresh_tokens.clone(),
            settings: test_settings(),
        }
    }

    pub fn record_count(&self) -> usize {
        self.refresh_tokens.records.lock().unwrap().len()
    }
}
