use anyhow::Context as _;

use crate::domain::repository::EmailPort;
use crate::domain::types::CodePurpose;
use crate::error::AuthServiceError;

fn subject_for(purpose: CodePurpose) -> &'static str {
    match purpose {
        CodePurpose::Register => "Confirm your registration",
        CodePurpose::ForgotPassword => "Reset your password",
        CodePurpose::Login => "Your login code",
        CodePurpose::Disable2fa => "Confirm disabling two-factor auth",
    }
}

/// Delivers codes through a JSON HTTP email API (bearer-token style).
#[derive(Clone)]
pub struct HttpEmailClient {
    http: reqwest::Client,
    api_url: String,
    api_token: String,
}

impl HttpEmailClient {
    pub fn new(api_url: String, api_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_token,
        }
    }
}

impl EmailPort for HttpEmailClient {
    async fn send_code(
        &self,
        email: &str,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        let body = serde_json::json!({
            "to": email,
            "subject": subject_for(purpose),
            "text": format!("Your verification code is {code}. It expires shortly."),
        });
        self.http
            .post(&self.api_url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .context("send code email")?
            .error_for_status()
            .context("email api status")?;
        Ok(())
    }
}

/// Logs codes instead of sending them. Stands in when no email API is
/// configured (local development).
#[derive(Clone)]
pub struct LogEmailClient;

impl EmailPort for LogEmailClient {
    async fn send_code(
        &self,
        email: &str,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        tracing::info!(
            email = %email,
            purpose = purpose.as_str(),
            code = %code,
            "verification code issued (log delivery)"
        );
        Ok(())
    }
}

/// Delivery transport chosen at startup from configuration.
#[derive(Clone)]
pub enum EmailClient {
    Http(HttpEmailClient),
    Log(LogEmailClient),
}

impl EmailClient {
    pub fn from_config(api_url: Option<String>, api_token: String) -> Self {
        match api_url {
            Some(url) => Self::Http(HttpEmailClient::new(url, api_token)),
            None => Self::Log(LogEmailClient),
        }
    }
}

impl EmailPort for EmailClient {
    async fn send_code(
        &self,
        email: &str,
        purpose: CodePurpose,
        code: &str,
    ) -> Result<(), AuthServiceError> {
        match self {
            Self::Http(client) => client.send_code(email, purpose, code).await,
            Self::Log(client) => client.send_code(email, purpose, code).await,
        }
    }
}
