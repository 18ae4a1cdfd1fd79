//! authkit-core - Core types and traits for the authkit session layer.

pub mod config;
pub mod credentials;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;
pub mod validation;

pub use config::SessionConfig;
pub use credentials::Credentials;
pub use error::Error;
pub use tokens::{AccessToken, IdToken, RefreshToken, TokenBundle, TokenSet};
pub use traits::{CodeDelivery, IdentityProvider, SignUpOutput};
pub use types::{ClientSecret, PoolEndpoint, UserPoolId};
pub use validation::{MIN_PASSWORD_LENGTH, ValidationResult, is_valid_email, validate};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
