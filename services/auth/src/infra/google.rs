use anyhow::Context as _;
use serde::Deserialize;

use crate::domain::repository::IdentityProvider;
use crate::domain::types::ExternalIdentity;
use crate::error::AuthServiceError;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Google OAuth2 identity bridge: exchanges an authorization code for the
/// holder's verified profile via the token and userinfo endpoints.
#[derive(Clone)]
pub struct GoogleIdentityProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct UserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Consent-screen URL carrying an opaque state blob for the callback.
    pub fn authorization_url(&self, state: &str) -> String {
        reqwest::Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "offline"),
                ("include_granted_scopes", "true"),
                ("state", state),
            ],
        )
        .expect("static auth endpoint URL")
        .to_string()
    }
}

impl IdentityProvider for GoogleIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<ExternalIdentity, AuthServiceError> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("google token exchange")?
            .error_for_status()
            .context("google token exchange status")?
            .json()
            .await
            .context("google token exchange body")?;

        let info: UserInfo = self
            .http
            .get(USERINFO_ENDPOINT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("google userinfo")?
            .error_for_status()
            .context("google userinfo status")?
            .json()
            .await
            .context("google userinfo body")?;

        // Without an asserted email there is nothing to authenticate against.
        let email = info.email.ok_or(AuthServiceError::Unauthorized)?;
        Ok(ExternalIdentity {
            email,
            name: info.name.unwrap_or_default(),
            avatar: info.picture,
        })
    }
}
