//! File-backed identity provider implementation.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use authkit_core::error::{AuthError, Error, InvalidInputError};
use authkit_core::{
    AccessToken, CodeDelivery, Credentials, IdToken, IdentityProvider, MIN_PASSWORD_LENGTH,
    RefreshToken, Result, SignUpOutput, TokenBundle, TokenSet,
};

use crate::store::{FileStore, LocalUser, OutboxPurpose, PendingCode};

/// Lifetime of access and id tokens.
const ACCESS_TOKEN_SECONDS: i64 = 3600;
/// Lifetime of refresh tokens.
const REFRESH_TOKEN_DAYS: i64 = 30;
/// Lifetime of a sign-up confirmation code.
const CONFIRMATION_CODE_HOURS: i64 = 24;
/// Lifetime of a password reset code.
const RESET_CODE_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TokenKind {
    Access,
    Id,
    Refresh,
}

/// Claims carried by a local token.
#[derive(Debug, Serialize, Deserialize)]
struct LocalClaims {
    sub: String,
    username: String,
    kind: TokenKind,
    generation: u64,
    expires_at: DateTime<Utc>,
}

/// Filesystem-backed user pool.
///
/// Verification codes are written to the pool's outbox instead of being
/// emailed; see [`FileStore::latest_code`].
#[derive(Debug)]
pub struct FileProvider {
    store: FileStore,
    cost: u32,
    logins: RwLock<TokenBundle>,
}

impl FileProvider {
    /// Create a new file-backed pool at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_cost(root, DEFAULT_COST)
    }

    /// Create a pool that hashes passwords with the given bcrypt cost.
    pub fn with_cost(root: impl AsRef<Path>, cost: u32) -> Self {
        Self {
            store: FileStore::new(root),
            cost,
            logins: RwLock::new(TokenBundle::default()),
        }
    }

    /// Access the underlying file store.
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordPolicy(format!(
                "password must have at least {} characters",
                MIN_PASSWORD_LENGTH
            ))
            .into());
        }

        hash(password, self.cost).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })
    }

    fn make_token(user: &LocalUser, kind: TokenKind, expires_at: DateTime<Utc>) -> Result<String> {
        let claims = LocalClaims {
            sub: user.sub.clone(),
            username: user.username.clone(),
            kind,
            generation: user.token_generation,
            expires_at,
        };
        serde_json::to_string(&claims).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })
    }

    fn parse_token(token: &str) -> Option<LocalClaims> {
        serde_json::from_str(token).ok()
    }

    fn issue(&self, user: &LocalUser, with_refresh: bool) -> Result<TokenSet> {
        let now = Utc::now();
        let access_expiry = now + Duration::seconds(ACCESS_TOKEN_SECONDS);

        let refresh_token = if with_refresh {
            let expiry = now + Duration::days(REFRESH_TOKEN_DAYS);
            Some(RefreshToken::new(Self::make_token(
                user,
                TokenKind::Refresh,
                expiry,
            )?))
        } else {
            None
        };

        Ok(TokenSet {
            access_token: AccessToken::new(Self::make_token(
                user,
                TokenKind::Access,
                access_expiry,
            )?),
            id_token: Some(IdToken::new(Self::make_token(
                user,
                TokenKind::Id,
                access_expiry,
            )?)),
            refresh_token,
            expires_at: access_expiry,
        })
    }

    fn verify_password(password: &str, user: &LocalUser) -> Result<bool> {
        verify(password, &user.password_hash).map_err(|e| {
            Error::InvalidInput(InvalidInputError::Other {
                message: e.to_string(),
            })
        })
    }

    fn fresh_code(hours: i64) -> PendingCode {
        PendingCode {
            code: format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000),
            expires_at: Utc::now() + Duration::hours(hours),
        }
    }

    fn check_code(pending: Option<&PendingCode>, code: &str) -> Result<()> {
        let pending = pending.ok_or(AuthError::CodeMismatch)?;
        if Utc::now() >= pending.expires_at {
            return Err(AuthError::ExpiredCode.into());
        }
        if pending.code != code.trim() {
            return Err(AuthError::CodeMismatch.into());
        }
        Ok(())
    }
}

/// Mask an address the way providers report delivery destinations:
/// `alice@example.com` becomes `a***@e***.com`.
pub(crate) fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return "***".to_string();
    };
    let first = |s: &str| s.chars().next().map(String::from).unwrap_or_default();
    let tld = domain.rsplit_once('.').map(|(_, t)| t).unwrap_or("");
    format!("{}***@{}***.{}", first(local), first(domain), tld)
}

#[async_trait]
impl IdentityProvider for FileProvider {
    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenSet> {
        let incorrect = || AuthError::InvalidCredentials("Incorrect username or password.".into());

        let user = self
            .store
            .find_user(credentials.username())?
            .ok_or_else(incorrect)?;

        if !Self::verify_password(credentials.password(), &user)? {
            return Err(incorrect().into());
        }

        if !user.confirmed {
            return Err(AuthError::UserNotConfirmed.into());
        }

        debug!(sub = %user.sub, "Local user authenticated");
        self.issue(&user, true)
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn register(&self, credentials: &Credentials) -> Result<SignUpOutput> {
        let password_hash = self.hash_password(credentials.password())?;
        let pending = Self::fresh_code(CONFIRMATION_CODE_HOURS);
        let code = pending.code.clone();

        let user = self
            .store
            .create_user(credentials.username(), &password_hash, pending)?;

        self.store
            .append_outbox(&user.username, OutboxPurpose::ConfirmSignUp, &code)?;

        info!(sub = %user.sub, "Local user registered");

        Ok(SignUpOutput {
            user_sub: user.sub,
            confirmed: false,
            delivery: Some(CodeDelivery {
                destination: Some(mask_email(&user.username)),
                medium: Some("EMAIL".to_string()),
            }),
        })
    }

    #[instrument(skip(self, code))]
    async fn confirm_registration(&self, username: &str, code: &str) -> Result<()> {
        self.store.update_user(username, |user| {
            if user.confirmed {
                return Err(AuthError::InvalidCredentials(
                    "User cannot be confirmed. Current status is CONFIRMED".into(),
                )
                .into());
            }
            Self::check_code(user.pending_confirmation.as_ref(), code)?;
            user.confirmed = true;
            user.pending_confirmation = None;
            Ok(())
        })
    }

    #[instrument(skip(self))]
    async fn request_reset(&self, username: &str) -> Result<CodeDelivery> {
        let pending = Self::fresh_code(RESET_CODE_HOURS);
        let code = pending.code.clone();

        let username = self.store.update_user(username, |user| {
            user.pending_reset = Some(pending);
            Ok(user.username.clone())
        })?;

        self.store
            .append_outbox(&username, OutboxPurpose::ResetPassword, &code)?;

        Ok(CodeDelivery {
            destination: Some(mask_email(&username)),
            medium: Some("EMAIL".to_string()),
        })
    }

    #[instrument(skip(self, code, new_password))]
    async fn confirm_reset(&self, username: &str, code: &str, new_password: &str) -> Result<()> {
        let password_hash = self.hash_password(new_password)?;

        self.store.update_user(username, |user| {
            Self::check_code(user.pending_reset.as_ref(), code)?;
            user.password_hash = password_hash;
            user.pending_reset = None;
            Ok(())
        })?;

        info!("Local password reset");
        Ok(())
    }

    #[instrument(skip(self, refresh_token))]
    async fn refresh_tokens(
        &self,
        username: &str,
        refresh_token: &RefreshToken,
    ) -> Result<TokenSet> {
        let claims = Self::parse_token(refresh_token.as_str())
            .filter(|c| c.kind == TokenKind::Refresh)
            .filter(|c| c.username.eq_ignore_ascii_case(username))
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if Utc::now() >= claims.expires_at {
            return Err(AuthError::RefreshTokenInvalid.into());
        }

        let user = self
            .store
            .get_user(&claims.sub)?
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if user.token_generation != claims.generation {
            return Err(AuthError::RefreshTokenInvalid.into());
        }

        self.issue(&user, false)
    }

    #[instrument(skip(self, access_token))]
    async fn sign_out(&self, access_token: &AccessToken) -> Result<()> {
        let revoked = || AuthError::InvalidCredentials("Access Token has been revoked".into());

        let claims = Self::parse_token(access_token.as_str())
            .filter(|c| c.kind == TokenKind::Access)
            .ok_or_else(revoked)?;

        if Utc::now() >= claims.expires_at {
            return Err(AuthError::InvalidCredentials("Access Token has expired".into()).into());
        }

        self.store.update_user(&claims.username, |user| {
            if user.sub != claims.sub || user.token_generation != claims.generation {
                return Err(revoked().into());
            }
            user.token_generation += 1;
            Ok(())
        })?;

        debug!(sub = %claims.sub, "Local tokens revoked");
        Ok(())
    }

    fn set_external_tokens(&self, tokens: TokenBundle) {
        *self.logins.write().unwrap_or_else(PoisonError::into_inner) = tokens;
    }

    fn external_tokens(&self) -> TokenBundle {
        self.logins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
