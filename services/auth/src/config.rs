/// Auth service configuration loaded from environment variables.
#[derive(Debug)]
pub struct AuthConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing access tokens.
    pub access_token_secret: String,
    /// HMAC secret for signing refresh tokens. Independent from the access
    /// secret so leaking one does not compromise the other token kind.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default 900). Env var: `ACCESS_TOKEN_TTL_SECS`.
    pub access_token_ttl_secs: u64,
    /// Refresh token lifetime in seconds (default 30 days). Env var: `REFRESH_TOKEN_TTL_SECS`.
    pub refresh_token_ttl_secs: u64,
    /// Email verification code lifetime in seconds (default 300). Env var: `OTP_TTL_SECS`.
    pub otp_ttl_secs: i64,
    /// Issuer name shown in authenticator apps (default "Vendo"). Env var: `TOTP_ISSUER`.
    pub totp_issuer: String,
    /// TCP port to listen on (default 3100). Env var: `AUTH_PORT`.
    pub auth_port: u16,
    /// OAuth client id for the Google identity bridge.
    pub google_client_id: String,
    /// OAuth client secret for the Google identity bridge.
    pub google_client_secret: String,
    /// Redirect URI registered with Google.
    pub google_redirect_uri: String,
    /// HTTP email API endpoint. Unset means codes are logged instead of sent.
    pub email_api_url: Option<String>,
    /// Bearer token for the email API. Env var: `EMAIL_API_TOKEN`.
    pub email_api_token: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            access_token_secret: std::env::var("ACCESS_TOKEN_SECRET")
                .expect("ACCESS_TOKEN_SECRET"),
            refresh_token_secret: std::env::var("REFRESH_TOKEN_SECRET")
                .expect("REFRESH_TOKEN_SECRET"),
            access_token_ttl_secs: std::env::var("ACCESS_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(900),
            refresh_token_ttl_secs: std::env::var("REFRESH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60 * 60 * 24 * 30),
            otp_ttl_secs: std::env::var("OTP_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            totp_issuer: std::env::var("TOTP_ISSUER").unwrap_or_else(|_| "Vendo".to_owned()),
            auth_port: std::env::var("AUTH_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3100),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID").expect("GOOGLE_CLIENT_ID"),
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
                .expect("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: std::env::var("GOOGLE_REDIRECT_URI")
                .expect("GOOGLE_REDIRECT_URI"),
            email_api_url: std::env::var("EMAIL_API_URL").ok(),
            email_api_token: std::env::var("EMAIL_API_TOKEN").unwrap_or_default(),
        }
    }
}
