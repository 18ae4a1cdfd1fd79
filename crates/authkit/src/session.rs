//! The authentication session facade.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use authkit_core::error::{AuthError, InvalidInputError};
use authkit_core::{
    CodeDelivery, Credentials, Error, IdentityProvider, Result, SessionConfig, SignUpOutput,
    TokenBundle, TokenSet, ValidationResult, is_valid_email, validate,
};

use crate::category::{UsageStats, UserCategory};
use crate::provider::connect;

/// Lifecycle phase of an [`AuthSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SignedOut,
    /// A login or registration is waiting on the provider.
    Authenticating,
    SignedIn,
    /// A token refresh is waiting on the provider.
    Refreshing,
}

/// The signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// The email the user signed in with.
    pub username: String,
    pub tokens: TokenSet,
}

#[derive(Debug, Clone)]
struct Snapshot {
    phase: Phase,
    user: Option<CurrentUser>,
}

impl Snapshot {
    fn signed_out() -> Self {
        Self {
            phase: Phase::SignedOut,
            user: None,
        }
    }

    fn signed_in(user: CurrentUser) -> Self {
        Self {
            phase: Phase::SignedIn,
            user: Some(user),
        }
    }
}

/// Authentication session over a user-pool identity provider.
///
/// Holds at most one signed-in user. Operations that change who is signed
/// in run one at a time; reads such as [`is_signed_in`](Self::is_signed_in)
/// never wait on the provider.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: Arc<SessionConfig>,
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<Snapshot>,
    usage: RwLock<UsageStats>,
    op_lock: Mutex<()>,
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("config", &self.inner.config)
            .field("provider", &self.inner.provider)
            .field("phase", &self.state())
            .finish()
    }
}

impl AuthSession {
    /// Create a session for `config`, choosing the provider by endpoint.
    pub fn new(config: SessionConfig) -> Result<Self> {
        let provider = connect(&config)?;
        Ok(Self::with_provider(config, provider))
    }

    /// Create a session over an explicit provider.
    pub fn with_provider(config: SessionConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config: Arc::new(config),
                provider,
                state: RwLock::new(Snapshot::signed_out()),
                usage: RwLock::new(UsageStats::default()),
                op_lock: Mutex::new(()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.provider
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns true if a user is signed in and their tokens are not known to
    /// have expired.
    pub fn is_signed_in(&self) -> bool {
        self.read_state()
            .user
            .as_ref()
            .is_some_and(|user| !user.tokens.is_known_expired(Utc::now()))
    }

    pub fn state(&self) -> Phase {
        self.read_state().phase
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read_state().user.clone()
    }

    pub fn usage(&self) -> UsageStats {
        *self.inner.usage.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn user_category(&self) -> UserCategory {
        self.usage().category()
    }

    /// Analytics tag for this device, e.g. `returning-created-avatar`.
    ///
    /// See [`UsageStats`] for how sign-ins are counted.
    pub fn user_category_tag(&self) -> &'static str {
        self.user_category().as_str()
    }

    /// Check credential syntax. See [`authkit_core::validate`].
    pub fn validate(email: &str, password_a: &str, password_b: &str) -> ValidationResult {
        validate(email, password_a, password_b)
    }

    // ========================================================================
    // Session lifecycle
    // ========================================================================

    /// Sign in with an email and password.
    ///
    /// Missing or malformed input is rejected without contacting the
    /// provider. A short password is left for the provider to judge.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        match validate(email, password, "") {
            result @ (ValidationResult::NoEmail
            | ValidationResult::InvalidEmail
            | ValidationResult::NoPassword) => return Err(Error::Validation(result)),
            _ => {}
        }

        let _op = self.inner.op_lock.lock().await;
        let prior = self.enter(Phase::Authenticating);

        let credentials = Credentials::new(email, password);
        match self.inner.provider.authenticate(&credentials).await {
            Ok(tokens) => {
                self.set_state(Snapshot::signed_in(CurrentUser {
                    username: credentials.username().to_string(),
                    tokens,
                }));
                self.update_usage(|usage| usage.sign_ins = usage.sign_ins.saturating_add(1));
                info!("Signed in");
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "Sign-in failed");
                self.set_state(prior);
                Err(err)
            }
        }
    }

    /// Create an account. The user is not signed in afterwards.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<SignUpOutput> {
        let result = validate(email, password, "");
        if !result.is_valid() {
            return Err(Error::Validation(result));
        }

        let _op = self.inner.op_lock.lock().await;
        let prior = self.enter(Phase::Authenticating);

        let outcome = self
            .inner
            .provider
            .register(&Credentials::new(email, password))
            .await;

        self.set_state(prior);

        let output = outcome?;
        info!(confirmed = output.confirmed, "Registered");
        Ok(output)
    }

    /// Confirm a registration with the code sent to the user.
    #[instrument(skip(self, code))]
    pub async fn confirm_registration(&self, email: &str, code: &str) -> Result<()> {
        let email = checked_email(email)?;
        let code = checked_code(code)?;
        self.inner.provider.confirm_registration(email, code).await
    }

    /// Ask the provider to send a password reset code.
    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<CodeDelivery> {
        let email = checked_email(email)?;
        self.inner.provider.request_reset(email).await
    }

    /// Set a new password using a reset code.
    #[instrument(skip(self, code, new_password))]
    pub async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        let result = validate(email, new_password, "");
        if !result.is_valid() {
            return Err(Error::Validation(result));
        }
        let code = checked_code(code)?;

        self.inner
            .provider
            .confirm_reset(email.trim(), code, new_password)
            .await
    }

    /// Refresh the current user's tokens.
    ///
    /// A failure that means the session cannot be renewed signs the user
    /// out; a transport failure leaves them signed in.
    #[instrument(skip(self))]
    pub async fn reauthenticate(&self) -> Result<()> {
        let _op = self.inner.op_lock.lock().await;

        let Some(user) = self.read_state().user.clone() else {
            return Err(Error::NoActiveSession);
        };
        self.enter(Phase::Refreshing);

        let outcome = match &user.tokens.refresh_token {
            Some(refresh_token) => {
                self.inner
                    .provider
                    .refresh_tokens(&user.username, refresh_token)
                    .await
            }
            None => Err(AuthError::RefreshTokenInvalid.into()),
        };

        match outcome {
            Ok(refreshed) => {
                let mut user = user;
                user.tokens.merge_refreshed(refreshed);
                self.set_state(Snapshot::signed_in(user));
                debug!("Tokens refreshed");
                Ok(())
            }
            Err(err) if err.ends_session() => {
                warn!(error = %err, "Refresh rejected, signing out");
                self.set_state(Snapshot::signed_out());
                Err(err)
            }
            Err(err) => {
                warn!(error = %err, "Refresh failed, keeping session");
                self.set_state(Snapshot::signed_in(user));
                Err(err)
            }
        }
    }

    /// Sign out everywhere.
    ///
    /// The local session is cleared even when the provider call fails; its
    /// error is still returned.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let _op = self.inner.op_lock.lock().await;

        let Some(user) = self.read_state().user.clone() else {
            return Err(Error::NoActiveSession);
        };

        let outcome = self.inner.provider.sign_out(&user.tokens.access_token).await;
        self.set_state(Snapshot::signed_out());

        match &outcome {
            Ok(()) => info!("Signed out"),
            Err(err) => warn!(error = %err, "Provider sign-out failed; cleared local session"),
        }
        outcome
    }

    /// Re-install persisted usage counters and, if one was signed in, the
    /// persisted user.
    pub async fn restore(&self, user: Option<CurrentUser>, usage: UsageStats) {
        let _op = self.inner.op_lock.lock().await;
        self.set_state(match user {
            Some(user) => Snapshot::signed_in(user),
            None => Snapshot::signed_out(),
        });
        self.update_usage(|current| *current = usage);
    }

    /// Pass tokens from another identity provider through to the client.
    pub fn set_external_tokens(&self, tokens: TokenBundle) {
        self.inner.provider.set_external_tokens(tokens);
    }

    pub fn external_tokens(&self) -> TokenBundle {
        self.inner.provider.external_tokens()
    }

    /// Record that the user has produced an avatar.
    pub fn record_avatar_created(&self) {
        self.update_usage(|usage| usage.avatar_created = true);
    }

    // ========================================================================
    // State helpers
    // ========================================================================

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, Snapshot> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, snapshot: Snapshot) {
        *self.inner.state.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Move to `phase`, keeping the user, and return the previous snapshot.
    fn enter(&self, phase: Phase) -> Snapshot {
        let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        let prior = state.clone();
        state.phase = phase;
        prior
    }

    fn update_usage(&self, apply: impl FnOnce(&mut UsageStats)) {
        let mut usage = self.inner.usage.write().unwrap_or_else(PoisonError::into_inner);
        apply(&mut *usage);
    }
}

fn checked_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::Validation(ValidationResult::NoEmail));
    }
    if !is_valid_email(email) {
        return Err(Error::Validation(ValidationResult::InvalidEmail));
    }
    Ok(email)
}

fn checked_code(code: &str) -> Result<&str> {
    let code = code.trim();
    if code.is_empty() {
        return Err(InvalidInputError::Other {
            message: "verification code is empty".to_string(),
        }
        .into());
    }
    Ok(code)
}
