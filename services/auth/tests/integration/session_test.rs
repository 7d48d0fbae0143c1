use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use vendo_auth::error::AuthServiceError;
use vendo_auth::usecase::token::RefreshTokenClaims;

use crate::helpers::{TestWorld, test_settings};

#[tokio::test]
async fn should_rotate_into_a_fresh_pair_and_retire_the_old_token() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "old-agent", "198.51.100.1")
        .await
        .unwrap();
    let original = registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    let rotated = registry
        .rotate(&original.refresh_token, "new-agent", "198.51.100.2")
        .await
        .unwrap();

    assert_ne!(rotated.access_token, original.access_token);
    assert_ne!(rotated.refresh_token, original.refresh_token);

    // Exactly one live record — the replacement.
    let records = world.refresh_tokens.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].token, rotated.refresh_token);
    assert_eq!(records[0].device_id, device.id);
    drop(records);

    // The device binding followed the rotation.
    let devices = world.devices.devices.lock().unwrap();
    assert_eq!(devices[0].user_agent, "new-agent");
    assert_eq!(devices[0].ip, "198.51.100.2");
}

#[tokio::test]
async fn should_reject_reuse_of_a_rotated_token() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "agent", "198.51.100.1")
        .await
        .unwrap();
    let original = registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    registry
        .rotate(&original.refresh_token, "agent", "198.51.100.1")
        .await
        .unwrap();
    let replay = registry
        .rotate(&original.refresh_token, "agent", "198.51.100.1")
        .await;
    assert!(matches!(replay, Err(AuthServiceError::RefreshTokenRevoked)));
}

#[tokio::test]
async fn concurrent_rotations_admit_exactly_one_winner() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "agent", "198.51.100.1")
        .await
        .unwrap();
    let original = registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        registry.rotate(&original.refresh_token, "agent-a", "198.51.100.2"),
        registry.rotate(&original.refresh_token, "agent-b", "198.51.100.3"),
    );

    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one rotation must win");
    let loser = if first.is_ok() { second } else { first };
    assert!(matches!(loser, Err(AuthServiceError::RefreshTokenRevoked)));

    // The winner's replacement is the only record left.
    assert_eq!(world.record_count(), 1);
}

#[tokio::test]
async fn should_reject_second_logout_with_revoked() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "agent", "198.51.100.1")
        .await
        .unwrap();
    let tokens = registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    registry.revoke(&tokens.refresh_token).await.unwrap();

    // Logout is terminal: the device is inactive and the record gone.
    assert!(!world.devices.devices.lock().unwrap()[0].is_active);
    assert_eq!(world.record_count(), 0);

    let again = registry.revoke(&tokens.refresh_token).await;
    assert!(matches!(again, Err(AuthServiceError::RefreshTokenRevoked)));
}

#[tokio::test]
async fn should_reject_unverifiable_token_before_any_mutation() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "agent", "198.51.100.1")
        .await
        .unwrap();
    registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    let result = registry.rotate("not-a-jwt", "agent", "198.51.100.1").await;
    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
    // The store was never touched.
    assert_eq!(world.record_count(), 1);
}

#[tokio::test]
async fn expired_refresh_token_fails_verification_not_the_record_lookup() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    // A record row may still exist for a token whose signature has expired;
    // consumption dies at the verification step.
    let settings = test_settings();
    let claims = RefreshTokenClaims {
        sub: user.id.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: 1_000_000,
    };
    let stale = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.refresh_secret.as_bytes()),
    )
    .unwrap();

    let result = registry.rotate(&stale, "agent", "198.51.100.1").await;
    assert!(matches!(result, Err(AuthServiceError::Unauthorized)));
}

#[tokio::test]
async fn revoked_record_never_revives() {
    let (world, user) = TestWorld::with_user(|_| {});
    let registry = world.session_registry();

    let device = registry
        .register_device(user.id, "agent", "198.51.100.1")
        .await
        .unwrap();
    let tokens = registry
        .issue_session(user.id, device.id, world.role.id, &world.role.name)
        .await
        .unwrap();

    registry.revoke(&tokens.refresh_token).await.unwrap();

    // Neither rotation nor another revoke can resurrect a deleted record.
    let rotate = registry
        .rotate(&tokens.refresh_token, "agent", "198.51.100.1")
        .await;
    assert!(matches!(rotate, Err(AuthServiceError::RefreshTokenRevoked)));
    assert_eq!(world.record_count(), 0);
}
