use chrono::{Duration, Utc};
use rand::RngExt;

use crate::domain::repository::{EmailPort, UserRepository, VerificationCodeRepository};
use crate::domain::types::{CodePurpose, VerificationCode};
use crate::error::AuthServiceError;

/// Uniformly random six-digit code, zero-padded ("007301" is valid).
pub fn generate_otp_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..=999_999u32))
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub email: String,
    pub purpose: CodePurpose,
}

pub struct RequestOtpUseCase<U, V, E>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    E: EmailPort,
{
    pub users: U,
    pub codes: V,
    pub email: E,
    pub otp_ttl_secs: i64,
}

impl<U, V, E> RequestOtpUseCase<U, V, E>
where
    U: UserRepository,
    V: VerificationCodeRepository,
    E: EmailPort,
{
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), AuthServiceError> {
        match input.purpose {
            CodePurpose::Register => {
                if self.users.find_by_email(&input.email).await?.is_some() {
                    return Err(AuthServiceError::EmailAlreadyExists);
                }
            }
            CodePurpose::ForgotPassword => {
                if self.users.find_by_email(&input.email).await?.is_none() {
                    return Err(AuthServiceError::EmailNotFound);
                }
            }
            CodePurpose::Login | CodePurpose::Disable2fa => {}
        }

        let now = Utc::now();
        let code = VerificationCode {
            email: input.email.clone(),
            purpose: input.purpose,
            code: generate_otp_code(),
            expires_at: now + Duration::seconds(self.otp_ttl_secs),
            created_at: now,
        };
        self.codes.upsert(&code).await?;

        // The code stays issued on delivery failure — the caller may retry
        // delivery as-is or re-request and overwrite it.
        self.email
            .send_code(&input.email, input.purpose, &code.code)
            .await
            .map_err(|_| AuthServiceError::OtpDeliveryFailed)?;
        Ok(())
    }
}

// ── Code consumption ─────────────────────────────────────────────────────────

/// Check a submitted code without consuming it. A missing row and a
/// mismatched code are indistinguishable (`InvalidOtp`); expiry is checked
/// after the match, so the error order is deterministic.
pub async fn check_code<V: VerificationCodeRepository>(
    codes: &V,
    email: &str,
    purpose: CodePurpose,
    submitted: &str,
) -> Result<(), AuthServiceError> {
    let record = codes
        .find(email, purpose)
        .await?
        .ok_or(AuthServiceError::InvalidOtp)?;
    if record.code != submitted {
        return Err(AuthServiceError::InvalidOtp);
    }
    if record.is_expired() {
        return Err(AuthServiceError::OtpExpired);
    }
    Ok(())
}

/// Check then delete — a consumed code can never be consumed again.
pub async fn consume_code<V: VerificationCodeRepository>(
    codes: &V,
    email: &str,
    purpose: CodePurpose,
    submitted: &str,
) -> Result<(), AuthServiceError> {
    check_code(codes, email, purpose, submitted).await?;
    codes.delete(email, purpose).await
}
