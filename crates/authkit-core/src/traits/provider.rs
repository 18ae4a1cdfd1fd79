//! Identity provider trait.

use async_trait::async_trait;

use crate::{AccessToken, Credentials, RefreshToken, Result, TokenBundle, TokenSet};

/// Where a verification code was sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeDelivery {
    /// Masked destination, e.g. `a***@e***.com`.
    pub destination: Option<String>,
    /// Delivery medium, e.g. `EMAIL` or `SMS`.
    pub medium: Option<String>,
}

/// Output from account registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpOutput {
    /// Provider-assigned subject identifier of the new user.
    pub user_sub: String,
    /// Whether the account can sign in without a confirmation code.
    pub confirmed: bool,
    /// Where the confirmation code went, if one was sent.
    pub delivery: Option<CodeDelivery>,
}

/// A user-pool identity provider client.
///
/// Completions may resolve on any runtime worker thread; implementations
/// must be shareable across tasks.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Exchange a username and password for tokens.
    async fn authenticate(&self, credentials: &Credentials) -> Result<TokenSet>;

    /// Create a new account whose username is its email address.
    async fn register(&self, credentials: &Credentials) -> Result<SignUpOutput>;

    /// Confirm a new account with the code sent during registration.
    async fn confirm_registration(&self, username: &str, code: &str) -> Result<()>;

    /// Send a password reset code.
    async fn request_reset(&self, username: &str) -> Result<CodeDelivery>;

    /// Set a new password using a reset code.
    async fn confirm_reset(&self, username: &str, code: &str, new_password: &str) -> Result<()>;

    /// Obtain fresh tokens with a refresh token.
    async fn refresh_tokens(&self, username: &str, refresh_token: &RefreshToken)
    -> Result<TokenSet>;

    /// Invalidate every token issued to the user.
    async fn sign_out(&self, access_token: &AccessToken) -> Result<()>;

    /// Accept tokens obtained from another identity provider.
    fn set_external_tokens(&self, _tokens: TokenBundle) {}

    /// Tokens previously handed to [`IdentityProvider::set_external_tokens`].
    fn external_tokens(&self) -> TokenBundle {
        TokenBundle::default()
    }
}
