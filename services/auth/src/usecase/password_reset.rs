use crate::domain::password::hash_password;
use crate::domain::repository::{UserRepository, VerificationCodeRepository};
use crate::domain::types::CodePurpose;
use crate::error::AuthServiceError;
use crate::usecase::otp::check_code;

pub struct ForgotPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
    pub confirm_new_password: String,
}

pub struct ForgotPasswordUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub users: U,
    pub codes: V,
}

impl<U, V> ForgotPasswordUseCase<U, V>
where
    U: UserRepository,
    V: VerificationCodeRepository,
{
    pub async fn execute(&self, input: ForgotPasswordInput) -> Result<(), AuthServiceError> {
        if input.new_password != input.confirm_new_password {
            return Err(AuthServiceError::PasswordMismatch);
        }

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthServiceError::EmailNotFound)?;

        check_code(&self.codes, &input.email, CodePurpose::ForgotPassword, &input.code).await?;

        let password_hash = hash_password(&input.new_password)
            .map_err(|e| AuthServiceError::Internal(anyhow::anyhow!("hash password: {e}")))?;

        // Independent writes; both must land before success is reported.
        tokio::try_join!(
            self.users.update_password_hash(user.id, &password_hash),
            self.codes.delete(&input.email, CodePurpose::ForgotPassword),
        )?;
        Ok(())
    }
}
