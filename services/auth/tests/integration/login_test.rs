use std::time::{SystemTime, UNIX_EPOCH};

use totp_rs::{Algorithm, Secret, TOTP};

use vendo_auth::domain::types::CodePurpose;
use vendo_auth::error::AuthServiceError;
use vendo_auth::usecase::login::{LoginInput, LoginUseCase};
use vendo_auth::usecase::token::{validate_access_token, validate_refresh_token};
use vendo_auth::usecase::two_factor::generate_totp_secret;

use crate::helpers::{MockCodeRepo, TEST_ISSUER, TestWorld, live_code, test_settings};

fn login_input(password: &str) -> LoginInput {
    LoginInput {
        email: "a@x.com".to_owned(),
        password: password.to_owned(),
        user_agent: "integration-test".to_owned(),
        ip: "203.0.113.9".to_owned(),
        totp_code: None,
        otp_code: None,
    }
}

fn usecase(
    world: &TestWorld,
) -> LoginUseCase<
    crate::helpers::MockUserRepo,
    MockCodeRepo,
    crate::helpers::MockDeviceRepo,
    crate::helpers::MockRefreshTokenRepo,
> {
    LoginUseCase {
        users: world.users.clone(),
        codes: world.codes.clone(),
        sessions: world.session_registry(),
        totp_issuer: TEST_ISSUER.to_owned(),
    }
}

/// Code the authenticator app would display at `offset` seconds from now.
fn totp_code_at_offset(secret_base32: &str, offset: i64) -> String {
    let secret = Secret::Encoded(secret_base32.to_owned()).to_bytes().unwrap();
    let totp = TOTP::new(
        Algorithm::SHA1,
        6,
        1,
        30,
        secret,
        Some(TEST_ISSUER.to_owned()),
        "a@x.com".to_owned(),
    )
    .unwrap();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;
    totp.generate((now + offset) as u64)
}

#[tokio::test]
async fn should_fail_email_not_found() {
    let (world, _) = TestWorld::with_user(|_| {});
    let mut input = login_input("Passw0rd!");
    input.email = "nobody@x.com".to_owned();

    let result = usecase(&world).execute(input).await;
    assert!(matches!(result, Err(AuthServiceError::EmailNotFound)));
}

#[tokio::test]
async fn should_fail_invalid_password() {
    let (world, _) = TestWorld::with_user(|_| {});
    let result = usecase(&world).execute(login_input("WrongPass!")).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidPassword)));
}

#[tokio::test]
async fn should_issue_session_without_second_factor() {
    let (world, user) = TestWorld::with_user(|_| {});
    let tokens = usecase(&world).execute(login_input("Passw0rd!")).await.unwrap();

    let settings = test_settings();
    let access = validate_access_token(&tokens.access_token, &settings).unwrap();
    assert_eq!(access.sub, user.id.to_string());
    assert_eq!(access.role_name, "Client");
    let refresh = validate_refresh_token(&tokens.refresh_token, &settings).unwrap();
    assert_eq!(refresh.sub, user.id.to_string());

    // A device was bound and exactly one refresh record persisted, carrying
    // the expiry decoded from the token itself.
    let devices = world.devices.devices.lock().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].user_agent, "integration-test");
    assert!(devices[0].is_active);
    let records = world.refresh_tokens.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].token, tokens.refresh_token);
    assert_eq!(records[0].expires_at.timestamp() as u64, refresh.exp);
}

#[tokio::test]
async fn should_require_second_factor_when_enrolled() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret));

    let result = usecase(&world).execute(login_input("Passw0rd!")).await;
    assert!(matches!(result, Err(AuthServiceError::SecondFactorRequired)));
    assert_eq!(world.record_count(), 0);
}

#[tokio::test]
async fn should_accept_current_step_totp() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret.clone()));

    let mut input = login_input("Passw0rd!");
    input.totp_code = Some(totp_code_at_offset(&secret, 0));
    usecase(&world).execute(input).await.unwrap();
}

#[tokio::test]
async fn should_accept_previous_step_totp_within_skew() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret.clone()));

    let mut input = login_input("Passw0rd!");
    input.totp_code = Some(totp_code_at_offset(&secret, -30));
    usecase(&world).execute(input).await.unwrap();
}

#[tokio::test]
async fn should_reject_totp_two_steps_away() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret.clone()));

    let stale = totp_code_at_offset(&secret, -60);
    // Guard against the rare collision where a two-step-old code equals one
    // inside the accept window.
    if [0, -30, 30]
        .iter()
        .any(|&offset| totp_code_at_offset(&secret, offset) == stale)
    {
        return;
    }
    let mut input = login_input("Passw0rd!");
    input.totp_code = Some(stale);
    let result = usecase(&world).execute(input).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidOtp)));
}

#[tokio::test]
async fn should_accept_email_otp_when_no_totp_supplied() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret));
    world.codes.rows.lock().unwrap().push(live_code(
        "a@x.com",
        CodePurpose::Login,
        "482913",
    ));

    let mut input = login_input("Passw0rd!");
    input.otp_code = Some("482913".to_owned());
    usecase(&world).execute(input).await.unwrap();

    // The login OTP was consumed.
    assert!(world.codes.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_wrong_email_otp() {
    let (secret, _) = generate_totp_secret(TEST_ISSUER, "a@x.com").unwrap();
    let (world, _) = TestWorld::with_user(|u| u.totp_secret = Some(secret));
    world.codes.rows.lock().unwrap().push(live_code(
        "a@x.com",
        CodePurpose::Login,
        "482913",
    ));

    let mut input = login_input("Passw0rd!");
    input.otp_code = Some("000000".to_owned());
    let result = usecase(&world).execute(input).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidOtp)));
}
