use totp_rs::{Algorithm, Secret, TOTP};
use uuid::Uuid;

use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::types::CodePurpose;
use crate::error::AuthServiceError;
use crate::usecase::otp::consume_code;

const TOTP_DIGITS: usize = 6;
/// Accept codes one step either side of the current one (±30 s clock skew).
const TOTP_SKEW: u8 = 1;
const TOTP_STEP: u64 = 30;

fn build_totp(issuer: &str, email: &str, secret: Vec<u8>) -> Result<TOTP, AuthServiceError> {
    TOTP::new(
        Algorithm::SHA1,
        TOTP_DIGITS,
        TOTP_SKEW,
        TOTP_STEP,
        secret,
        Some(issuer.to_owned()),
        email.to_owned(),
    )
    .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("totp init: {e}")))
}

/// Fresh shared secret plus the otpauth:// provisioning URI for enrollment.
/// Nothing is persisted here; the caller owns the secret's lifecycle.
pub fn generate_totp_secret(
    issuer: &str,
    email: &str,
) -> Result<(String, String), AuthServiceError> {
    let secret = Secret::generate_secret()
        .to_bytes()
        .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("totp secret: {e:?}")))?;
    let totp = build_totp(issuer, email, secret)?;
    Ok((totp.get_secret_base32(), totp.get_url()))
}

/// Rebuild the generator from the stored base32 secret and check the
/// submitted code against the current step ±1.
pub fn verify_totp(issuer: &str, email: &str, secret_base32: &str, code: &str) -> bool {
    let Ok(secret) = Secret::Encoded(secret_base32.to_owned()).to_bytes() else {
        return false;
    };
    let Ok(totp) = build_totp(issuer, email, secret) else {
        return false;
    };
    totp.check_current(code).unwrap_or(false)
}

// ── SetupTwoFactor ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct SetupTwoFactorOutput {
    pub secret: String,
    pub provisioning_uri: String,
}

pub struct SetupTwoFactorUseCase<U: UserRepository> {
    pub users: U,
    pub issuer: String,
}

impl<U: UserRepository> SetupTwoFactorUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<SetupTwoFactorOutput, AuthServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::EmailNotFound)?;
        if user.two_factor_enabled() {
            return Err(AuthServiceError::TwoFactorAlreadyEnabled);
        }

        let (secret, provisioning_uri) = generate_totp_secret(&self.issuer, &user.email)?;
        // Persisted immediately; enrollment is not confirmed by a first code.
        self.users.set_totp_secret(user.id, Some(&secret)).await?;

        Ok(SetupTwoFactorOutput {
            secret,
            provisioning_uri,
        })
    }
}

// ── DisableTwoFactor ─────────────────────────────────────────────────────────

pub struct DisableTwoFactorInput {
    pub totp_code: Option<String>,
    pub otp_code: Option<String>,
}

pub struct DisableTwoFactorUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub users: U,
    pub codes: V,
    pub issuer: String,
}

impl<U, V> DisableTwoFactorUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: DisableTwoFactorInput,
    ) -> Result<(), AuthServiceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthServiceError::EmailNotFound)?;
        let Some(secret) = user.totp_secret.as_deref() else {
            return Err(AuthServiceError::TwoFactorNotEnabled);
        };

        match (&input.totp_code, &input.otp_code) {
            (None, None) => return Err(AuthServiceError::SecondFactorRequired),
            (Some(code), _) => {
                if !verify_totp(&self.issuer, &user.email, secret, code) {
                    return Err(AuthServiceError::InvalidOtp);
                }
            }
            (None, Some(code)) => {
                consume_code(&self.codes, &user.email, CodePurpose::Disable2fa, code).await?;
            }
        }

        self.users.set_totp_secret(user.id, None).await
    }
}
