use crate::domain::password::verify_password;
use crate::domain::repository::{
    DeviceRepository, RefreshTokenRepository, UserRepository, VerificationCodeRepository,
};
use crate::domain::types::CodePurpose;
use crate::error::AuthServiceError;
use crate::usecase::otp::consume_code;
use crate::usecase::session::{SessionRegistry, SessionTokens};
use crate::usecase::two_factor::verify_totp;

pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub user_agent: String,
    pub ip: String,
    pub totp_code: Option<String>,
    pub otp_code: Option<String>,
}

pub struct LoginUseCase<U, V, D, R>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    pub users: U,
    pub codes: V,
    pub sessions: SessionRegistry<D, R>,
    pub totp_issuer: String,
}

impl<U, V, D, R> LoginUseCase<U, V, D, R>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    D: DeviceRepository,
    R: RefreshTokenRepository,
{
    pub async fn execute(&self, input: LoginInput) -> Result<SessionTokens, AuthServiceError> {
        let (user, role) = self
            .users
            .find_by_email_with_role(&input.email)
            .await?
            .ok_or(AuthServiceError::EmailNotFound)?;

        if !verify_password(&input.password, &user.password_hash) {
            return Err(AuthServiceError::InvalidPassword);
        }

        // Enrolled users must present exactly one second-factor proof.
        // A supplied TOTP code takes precedence over an email OTP.
        if let Some(secret) = user.totp_secret.as_deref() {
            match (&input.totp_code, &input.otp_code) {
                (None, None) => return Err(AuthServiceError::SecondFactorRequired),
                (Some(code), _) => {
                    if !verify_totp(&self.totp_issuer, &user.email, secret, code) {
                        return Err(AuthServiceError::InvalidOtp);
                    }
                }
                (None, Some(code)) => {
                    consume_code(&self.codes, &user.email, CodePurpose::Login, code).await?;
                }
            }
        }

        let device = self
            .sessions
            .register_device(user.id, &input.user_agent, &input.ip)
            .await?;
        self.sessions
            .issue_session(user.id, device.id, role.id, &role.name)
            .await
    }
}
