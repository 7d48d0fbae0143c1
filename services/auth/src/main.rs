use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use vendo_auth::config::AuthConfig;
use vendo_auth::infra::email::EmailClient;
use vendo_auth::infra::google::GoogleIdentityProvider;
use vendo_auth::router::build_router;
use vendo_auth::state::AppState;
use vendo_auth::usecase::roles::DefaultRoleCache;
use vendo_auth::usecase::token::TokenSettings;

#[tokio::main]
async fn main() {
    vendo_core::tracing::init_tracing();

    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let email = EmailClient::from_config(config.email_api_url.clone(), config.email_api_token);
    let google = GoogleIdentityProvider::new(
        config.google_client_id,
        config.google_client_secret,
        config.google_redirect_uri,
    );

    let state = AppState {
        db,
        email,
        google,
        token_settings: TokenSettings {
            access_secret: config.access_token_secret,
            refresh_secret: config.refresh_token_secret,
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
        },
        totp_issuer: config.totp_issuer,
        otp_ttl_secs: config.otp_ttl_secs,
        default_role: Arc::new(DefaultRoleCache::new()),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
