//! AuthSession state machine tests against a scripted provider.

mod common;

use std::time::Duration;

use authkit::error::{AuthError, TransportError};
use authkit::{
    AccessToken, CurrentUser, Error, IdentityProvider, Phase, RefreshToken, TokenBundle,
    TokenSet, UsageStats, ValidationResult,
};
use chrono::Utc;
use common::{MockProvider, Outcome, session};

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_success_sets_user() {
    let (session, provider) = session();
    assert_eq!(session.state(), Phase::SignedOut);
    assert!(!session.is_signed_in());

    session
        .login("  alice@example.com ", "longenough1")
        .await
        .unwrap();

    assert_eq!(session.state(), Phase::SignedIn);
    assert!(session.is_signed_in());
    assert_eq!(session.current_user().unwrap().username, "alice@example.com");
    assert_eq!(session.usage().sign_ins, 1);
    assert_eq!(MockProvider::calls(&provider.authenticate_calls), 1);
}

#[tokio::test]
async fn test_login_invalid_input_never_reaches_provider() {
    let (session, provider) = session();

    for (email, password, expected) in [
        ("", "longenough1", ValidationResult::NoEmail),
        ("not-an-email", "longenough1", ValidationResult::InvalidEmail),
        ("a@b.com", "", ValidationResult::NoPassword),
    ] {
        let err = session.login(email, password).await.unwrap_err();
        assert!(matches!(err, Error::Validation(r) if r == expected));
    }

    assert_eq!(MockProvider::calls(&provider.authenticate_calls), 0);
    assert_eq!(session.state(), Phase::SignedOut);
}

#[tokio::test]
async fn test_login_short_password_is_left_to_provider() {
    let (session, provider) = session();
    session.login("a@b.com", "short").await.unwrap();
    assert_eq!(MockProvider::calls(&provider.authenticate_calls), 1);
}

#[tokio::test]
async fn test_login_failure_restores_signed_out() {
    let (session, provider) = session();
    provider.set_outcome(Outcome::RejectCredentials);

    let err = session.login("a@b.com", "wrongpass1").await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::InvalidCredentials(_))));
    assert_eq!(session.state(), Phase::SignedOut);
    assert!(session.current_user().is_none());
    assert_eq!(session.usage().sign_ins, 0);
}

#[tokio::test]
async fn test_failed_login_keeps_previous_user() {
    let (session, provider) = session();
    session.login("alice@example.com", "longenough1").await.unwrap();

    provider.set_outcome(Outcome::RejectCredentials);
    assert!(session.login("bob@example.com", "wrongpass1").await.is_err());

    assert_eq!(session.state(), Phase::SignedIn);
    assert_eq!(session.current_user().unwrap().username, "alice@example.com");
}

// ============================================================================
// Registration and password reset
// ============================================================================

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let (session, provider) = session();

    let output = session
        .register("new@example.com", "longenough1")
        .await
        .unwrap();

    assert!(!output.confirmed);
    assert_eq!(session.state(), Phase::SignedOut);
    assert!(!session.is_signed_in());
    assert_eq!(MockProvider::calls(&provider.register_calls), 1);
}

#[tokio::test]
async fn test_register_validates_password_length() {
    let (session, provider) = session();

    let err = session.register("new@example.com", "short").await.unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationResult::PasswordTooShort)
    ));
    assert_eq!(MockProvider::calls(&provider.register_calls), 0);
}

#[tokio::test]
async fn test_confirm_registration_requires_code() {
    let (session, provider) = session();
    assert!(session.confirm_registration("new@example.com", "  ").await.is_err());
    session
        .confirm_registration("new@example.com", "123456")
        .await
        .unwrap();
    assert_eq!(MockProvider::calls(&provider.register_calls), 1);
}

#[tokio::test]
async fn test_password_reset_requires_valid_email() {
    let (session, provider) = session();

    let err = session.request_password_reset("nope").await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationResult::InvalidEmail)));

    session.request_password_reset("a@b.com").await.unwrap();
    assert_eq!(MockProvider::calls(&provider.reset_calls), 1);
    assert_eq!(session.state(), Phase::SignedOut);
}

#[tokio::test]
async fn test_confirm_password_reset_validates_new_password() {
    let (session, provider) = session();

    let err = session
        .confirm_password_reset("a@b.com", "123456", "short")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationResult::PasswordTooShort)
    ));

    session
        .confirm_password_reset("a@b.com", "123456", "longenough1")
        .await
        .unwrap();
    assert_eq!(MockProvider::calls(&provider.reset_calls), 1);
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_reauthenticate_without_session() {
    let (session, provider) = session();

    let err = session.reauthenticate().await.unwrap_err();

    assert!(matches!(err, Error::NoActiveSession));
    assert_eq!(session.state(), Phase::SignedOut);
    assert_eq!(MockProvider::calls(&provider.refresh_calls), 0);
}

#[tokio::test]
async fn test_reauthenticate_keeps_refresh_token() {
    let (session, _provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    let before = session.current_user().unwrap().tokens;

    session.reauthenticate().await.unwrap();

    let after = session.current_user().unwrap().tokens;
    assert_eq!(session.state(), Phase::SignedIn);
    assert_ne!(after.access_token, before.access_token);
    assert_eq!(after.refresh_token, before.refresh_token);
}

#[tokio::test]
async fn test_revoked_refresh_signs_out() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    provider.set_outcome(Outcome::RevokedToken);

    let err = session.reauthenticate().await.unwrap_err();

    assert!(err.ends_session());
    assert_eq!(session.state(), Phase::SignedOut);
    assert!(session.current_user().is_none());
}

#[tokio::test]
async fn test_throttled_refresh_keeps_session() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    provider.set_outcome(Outcome::Throttled);

    let err = session.reauthenticate().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::RateLimited(_))));
    assert_eq!(session.state(), Phase::SignedIn);
    assert!(session.is_signed_in());
    assert!(session.current_user().unwrap().tokens.refresh_token.is_some());
}

#[tokio::test]
async fn test_network_failure_keeps_session() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    provider.set_outcome(Outcome::NetworkDown);

    let err = session.reauthenticate().await.unwrap_err();

    assert!(matches!(err, Error::Transport(TransportError::Connection { .. })));
    assert_eq!(session.state(), Phase::SignedIn);
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn test_missing_refresh_token_signs_out() {
    let (session, provider) = session();
    let tokens = TokenSet::issued_now(AccessToken::new("a"), None, None, 3600).unwrap();
    session
        .restore(
            Some(CurrentUser {
                username: "a@b.com".into(),
                tokens,
            }),
            UsageStats::default(),
        )
        .await;

    let err = session.reauthenticate().await.unwrap_err();

    assert!(matches!(err, Error::Auth(AuthError::RefreshTokenInvalid)));
    assert_eq!(session.state(), Phase::SignedOut);
    assert_eq!(MockProvider::calls(&provider.refresh_calls), 0);
}

#[tokio::test]
async fn test_expired_without_refresh_is_not_signed_in() {
    let (session, _provider) = session();
    let expired = TokenSet {
        access_token: AccessToken::new("a"),
        id_token: None,
        refresh_token: None,
        expires_at: Utc::now() - chrono::Duration::minutes(1),
    };
    session
        .restore(
            Some(CurrentUser {
                username: "a@b.com".into(),
                tokens: expired.clone(),
            }),
            UsageStats::default(),
        )
        .await;
    assert!(!session.is_signed_in());

    let renewable = TokenSet {
        refresh_token: Some(RefreshToken::new("r")),
        ..expired
    };
    session
        .restore(
            Some(CurrentUser {
                username: "a@b.com".into(),
                tokens: renewable,
            }),
            UsageStats::default(),
        )
        .await;
    assert!(session.is_signed_in());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_clears_user() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();

    session.logout().await.unwrap();

    assert_eq!(session.state(), Phase::SignedOut);
    assert!(!session.is_signed_in());
    assert_eq!(MockProvider::calls(&provider.sign_out_calls), 1);
}

#[tokio::test]
async fn test_logout_clears_user_even_when_provider_fails() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    provider.set_outcome(Outcome::NetworkDown);

    let err = session.logout().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(session.current_user().is_none());
    assert_eq!(session.state(), Phase::SignedOut);
}

#[tokio::test]
async fn test_logout_without_session() {
    let (session, provider) = session();
    assert!(matches!(
        session.logout().await.unwrap_err(),
        Error::NoActiveSession
    ));
    assert_eq!(MockProvider::calls(&provider.sign_out_calls), 0);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_login_and_logout_stay_consistent() {
    let (session, provider) = session();
    provider.set_delay(Duration::from_millis(20));

    for _ in 0..5 {
        let a = session.clone();
        let b = session.clone();
        let login = tokio::spawn(async move { a.login("a@b.com", "longenough1").await });
        let logout = tokio::spawn(async move { b.logout().await });
        let _ = login.await.unwrap();
        let _ = logout.await.unwrap();

        match session.state() {
            Phase::SignedIn => assert!(session.current_user().is_some()),
            Phase::SignedOut => assert!(session.current_user().is_none()),
            other => panic!("left in transient phase {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_state_is_authenticating_during_login() {
    let (session, provider) = session();
    provider.set_delay(Duration::from_millis(200));

    let signing_in = session.clone();
    let task = tokio::spawn(async move { signing_in.login("a@b.com", "longenough1").await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(session.state(), Phase::Authenticating);
    assert!(!session.is_signed_in());
    task.await.unwrap().unwrap();
    assert_eq!(session.state(), Phase::SignedIn);
}

#[tokio::test]
async fn test_is_signed_in_does_not_wait_for_provider() {
    let (session, provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();
    provider.set_delay(Duration::from_millis(200));

    let refreshing = session.clone();
    let task = tokio::spawn(async move { refreshing.reauthenticate().await });
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(session.state(), Phase::Refreshing);
    assert!(session.is_signed_in());
    task.await.unwrap().unwrap();
    assert_eq!(session.state(), Phase::SignedIn);
}

// ============================================================================
// Category and external tokens
// ============================================================================

#[tokio::test]
async fn test_category_progression() {
    let (session, _provider) = session();
    assert_eq!(session.user_category_tag(), "first-time");

    session.login("a@b.com", "longenough1").await.unwrap();
    assert_eq!(session.user_category_tag(), "first-time");

    session.record_avatar_created();
    assert_eq!(session.user_category_tag(), "first-time-created-avatar");

    session.logout().await.unwrap();
    session.login("a@b.com", "longenough1").await.unwrap();
    assert_eq!(session.user_category_tag(), "returning-created-avatar");
}

#[tokio::test]
async fn test_category_counts_every_account_on_the_device() {
    let (session, _provider) = session();
    session.login("alice@example.com", "longenough1").await.unwrap();
    session.logout().await.unwrap();

    session.login("bob@example.com", "longenough1").await.unwrap();

    assert_eq!(session.usage().sign_ins, 2);
    assert_eq!(session.user_category_tag(), "returning");
}

#[tokio::test]
async fn test_external_tokens_are_forwarded() {
    let (session, provider) = session();
    let mut bundle = TokenBundle::new();
    bundle.insert("accounts.google.com", "google-id-token");

    session.set_external_tokens(bundle.clone());

    assert_eq!(provider.external_tokens(), bundle);
    assert_eq!(session.external_tokens(), bundle);
}

#[tokio::test]
async fn test_restore_usage_without_user() {
    let (session, _provider) = session();
    session.login("a@b.com", "longenough1").await.unwrap();

    session
        .restore(
            None,
            UsageStats {
                sign_ins: 3,
                avatar_created: false,
            },
        )
        .await;

    assert_eq!(session.state(), Phase::SignedOut);
    assert_eq!(session.user_category_tag(), "returning");
}
