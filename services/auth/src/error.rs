use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("invalid otp")]
    InvalidOtp,
    #[error("otp expired")]
    OtpExpired,
    #[error("otp delivery failed")]
    OtpDeliveryFailed,
    #[error("email already exists")]
    EmailAlreadyExists,
    #[error("email not found")]
    EmailNotFound,
    #[error("invalid password")]
    InvalidPassword,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("second factor required")]
    SecondFactorRequired,
    #[error("two-factor auth already enabled")]
    TwoFactorAlreadyEnabled,
    #[error("two-factor auth not enabled")]
    TwoFactorNotEnabled,
    #[error("refresh token has been revoked")]
    RefreshTokenRevoked,
    #[error("unauthorized")]
    Unauthorized,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidOtp => "INVALID_OTP",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpDeliveryFailed => "OTP_DELIVERY_FAILED",
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::SecondFactorRequired => "SECOND_FACTOR_REQUIRED",
            Self::TwoFactorAlreadyEnabled => "TWO_FACTOR_ALREADY_ENABLED",
            Self::TwoFactorNotEnabled => "TWO_FACTOR_NOT_ENABLED",
            Self::RefreshTokenRevoked => "REFRESH_TOKEN_REVOKED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Request field the error concerns, for field-level client feedback.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidOtp | Self::OtpExpired => Some("code"),
            Self::EmailAlreadyExists | Self::EmailNotFound => Some("email"),
            Self::InvalidPassword => Some("password"),
            Self::PasswordMismatch => Some("confirm_password"),
            Self::SecondFactorRequired => Some("totp_code"),
            _ => None,
        }
    }

    /// Collapse anything the refresh/logout paths do not recognize into
    /// `Unauthorized`. A caller probing those endpoints must not be able to
    /// tell a malformed token from a storage failure.
    pub fn collapse_for_session_ops(self) -> Self {
        match self {
            Self::RefreshTokenRevoked => Self::RefreshTokenRevoked,
            _ => Self::Unauthorized,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidOtp
            | Self::OtpExpired
            | Self::InvalidPassword
            | Self::SecondFactorRequired
            | Self::RefreshTokenRevoked
            | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::EmailAlreadyExists
            | Self::TwoFactorAlreadyEnabled
            | Self::TwoFactorNotEnabled => StatusCode::CONFLICT,
            Self::EmailNotFound => StatusCode::NOT_FOUND,
            Self::PasswordMismatch => StatusCode::UNPROCESSABLE_ENTITY,
            Self::OtpDeliveryFailed => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some(field) = self.field() {
            body["field"] = serde_json::Value::String(field.to_owned());
        }
        (status, axum::Json(body)).into_response()
    }
}
