//! Shared test helpers: a scriptable in-memory identity provider.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use authkit::error::{AuthError, TransportError};
use authkit::{
    AccessToken, AuthSession, CodeDelivery, Credentials, IdToken, IdentityProvider,
    RefreshToken, Result, SessionConfig, SignUpOutput, TokenBundle, TokenSet, UserPoolId,
};

/// How the mock answers the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeed,
    RejectCredentials,
    RevokedToken,
    Throttled,
    NetworkDown,
}

impl Outcome {
    fn check(self) -> Result<()> {
        match self {
            Outcome::Succeed => Ok(()),
            Outcome::RejectCredentials => Err(AuthError::InvalidCredentials(
                "Incorrect username or password.".into(),
            )
            .into()),
            Outcome::RevokedToken => Err(AuthError::RefreshTokenInvalid.into()),
            Outcome::Throttled => Err(AuthError::RateLimited("Rate exceeded".into()).into()),
            Outcome::NetworkDown => Err(TransportError::Connection {
                message: "connection refused".into(),
            }
            .into()),
        }
    }
}

#[derive(Debug)]
pub struct MockProvider {
    outcome: Mutex<Outcome>,
    delay: Mutex<Duration>,
    issued: AtomicUsize,
    pub authenticate_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    logins: Mutex<TokenBundle>,
}

impl MockProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            outcome: Mutex::new(Outcome::Succeed),
            delay: Mutex::new(Duration::ZERO),
            issued: AtomicUsize::new(0),
            authenticate_calls: AtomicUsize::new(0),
            register_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            logins: Mutex::new(TokenBundle::new()),
        })
    }

    pub fn set_outcome(&self, outcome: Outcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn answer(&self, counter: &AtomicUsize) -> Result<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let outcome = *self.outcome.lock().unwrap();
        outcome.check()
    }

    fn tokens(&self, with_refresh: bool) -> TokenSet {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        TokenSet::issued_now(
            AccessToken::new(format!("access-{n}")),
            Some(IdToken::new(format!("id-{n}"))),
            with_refresh.then(|| RefreshToken::new(format!("refresh-{n}"))),
            3600,
        )
        .unwrap()
    }
}

#[async_trait]
impl IdentityProvider for MockProvider {
    async fn authenticate(&self, _credentials: &Credentials) -> Result<TokenSet> {
        self.answer(&self.authenticate_calls).await?;
        Ok(self.tokens(true))
    }

    async fn register(&self, credentials: &Credentials) -> Result<SignUpOutput> {
        self.answer(&self.register_calls).await?;
        Ok(SignUpOutput {
            user_sub: format!("sub-{}", credentials.username()),
            confirmed: false,
            delivery: Some(CodeDelivery {
                destination: Some("a***@e***.com".into()),
                medium: Some("EMAIL".into()),
            }),
        })
    }

    async fn confirm_registration(&self, _username: &str, _code: &str) -> Result<()> {
        self.answer(&self.register_calls).await
    }

    async fn request_reset(&self, _username: &str) -> Result<CodeDelivery> {
        self.answer(&self.reset_calls).await?;
        Ok(CodeDelivery::default())
    }

    async fn confirm_reset(&self, _username: &str, _code: &str, _new: &str) -> Result<()> {
        self.answer(&self.reset_calls).await
    }

    async fn refresh_tokens(&self, _username: &str, _token: &RefreshToken) -> Result<TokenSet> {
        self.answer(&self.refresh_calls).await?;
        Ok(self.tokens(false))
    }

    async fn sign_out(&self, _access_token: &AccessToken) -> Result<()> {
        self.answer(&self.sign_out_calls).await
    }

    fn set_external_tokens(&self, tokens: TokenBundle) {
        *self.logins.lock().unwrap() = tokens;
    }

    fn external_tokens(&self) -> TokenBundle {
        self.logins.lock().unwrap().clone()
    }
}

pub fn config() -> SessionConfig {
    SessionConfig::new(UserPoolId::new("us-east-1_Test1").unwrap(), "client-1").unwrap()
}

pub fn session() -> (AuthSession, Arc<MockProvider>) {
    let provider = MockProvider::new();
    let session = AuthSession::with_provider(config(), provider.clone());
    (session, provider)
}
