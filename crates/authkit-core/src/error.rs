//! Error types for authkit.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, provider, and input validation errors.

use std::fmt;
use thiserror::Error;

use crate::validation::ValidationResult;

/// The unified error type for authkit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors reported by the identity provider.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Any other provider-defined failure, forwarded verbatim.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Malformed configuration or identifiers.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Credentials rejected locally before any provider call.
    #[error("credentials rejected: {0}")]
    Validation(ValidationResult),

    /// The operation needs a signed-in user and there is none.
    #[error("no active session")]
    NoActiveSession,
}

impl Error {
    /// Returns true if a refresh failing with this error means the session
    /// can no longer be renewed.
    ///
    /// Rejected credentials or tokens and missing accounts end the session.
    /// Throttling, transport failures and everything else do not.
    pub fn ends_session(&self) -> bool {
        match self {
            Error::Auth(err) => err.ends_session(),
            Error::NoActiveSession => true,
            Error::Provider(err) => err.is_auth_error(),
            Error::Transport(_) | Error::InvalidInput(_) | Error::Validation(_) => false,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// Local storage failure (file-backed pools).
    #[error("I/O error: {message}")]
    Io { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong username or password, or a revoked token.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The account exists but its registration was never confirmed.
    #[error("user is not confirmed")]
    UserNotConfirmed,

    /// No account with this username.
    #[error("user not found")]
    UserNotFound,

    /// Registration for a username that is already taken.
    #[error("an account with this username already exists")]
    UsernameExists,

    /// Verification code does not match.
    #[error("verification code mismatch")]
    CodeMismatch,

    /// Verification code has expired.
    #[error("verification code expired")]
    ExpiredCode,

    /// The provider's password policy rejected the password.
    #[error("password rejected by policy: {0}")]
    PasswordPolicy(String),

    /// Too many attempts.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Refresh token is missing, invalid or expired.
    #[error("refresh token invalid")]
    RefreshTokenInvalid,

    /// The provider answered with a challenge this layer does not handle.
    #[error("unsupported authentication challenge: {0}")]
    ChallengeRequired(String),
}

impl AuthError {
    fn ends_session(&self) -> bool {
        match self {
            AuthError::InvalidCredentials(_)
            | AuthError::RefreshTokenInvalid
            | AuthError::UserNotFound
            | AuthError::UserNotConfirmed => true,
            AuthError::UsernameExists
            | AuthError::CodeMismatch
            | AuthError::ExpiredCode
            | AuthError::PasswordPolicy(_)
            | AuthError::RateLimited(_)
            | AuthError::ChallengeRequired(_) => false,
        }
    }
}

/// Opaque provider errors.
#[derive(Debug)]
pub struct ProviderError {
    /// HTTP status code (0 when not applicable).
    pub status: u16,
    /// Provider error code (if present).
    pub error: Option<String>,
    /// Error message from the provider.
    pub message: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    /// Create a new provider error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid user pool identifier.
    #[error("invalid user pool id '{value}': {reason}")]
    UserPoolId { value: String, reason: String },

    /// Invalid pool endpoint URL.
    #[error("invalid pool endpoint '{value}': {reason}")]
    PoolEndpoint { value: String, reason: String },

    /// Missing or malformed configuration value.
    #[error("invalid configuration '{key}': {reason}")]
    Config { key: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
