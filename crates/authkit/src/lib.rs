//! authkit - Authentication session facade.
//!
//! Validates credential input, forwards sign-in, sign-up, password reset,
//! refresh and sign-out to a user-pool identity provider, and tracks the
//! signed-in user.
//!
//! # Example
//!
//! ```no_run
//! use authkit::{AuthSession, SessionConfig, UserPoolId};
//!
//! # async fn example() -> Result<(), authkit::Error> {
//! let config = SessionConfig::new(UserPoolId::new("us-east-1_AbCdEf123")?, "app-client-id")?;
//! let session = AuthSession::new(config)?;
//!
//! session.login("alice@example.com", "correct horse").await?;
//! assert!(session.is_signed_in());
//! println!("{}", session.user_category_tag());
//!
//! session.logout().await?;
//! # Ok(())
//! # }
//! ```

mod category;
mod provider;
mod session;
mod shared;

pub use category::{UsageStats, UserCategory};
pub use provider::connect;
pub use session::{AuthSession, CurrentUser, Phase};
pub use shared::{install, shared};

pub use authkit_core::error;
pub use authkit_core::{
    AccessToken, ClientSecret, CodeDelivery, Credentials, Error, IdToken, IdentityProvider,
    PoolEndpoint, RefreshToken, Result, SessionConfig, SignUpOutput, TokenBundle, TokenSet,
    UserPoolId, ValidationResult, validate,
};
