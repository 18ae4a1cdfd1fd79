//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{Error, InvalidInputError};
use crate::types::{ClientSecret, PoolEndpoint, UserPoolId};

/// Environment variable naming the AWS region.
pub const ENV_REGION: &str = "AUTHKIT_REGION";
/// Environment variable naming the user pool.
pub const ENV_USER_POOL_ID: &str = "AUTHKIT_USER_POOL_ID";
/// Environment variable naming the app client.
pub const ENV_CLIENT_ID: &str = "AUTHKIT_CLIENT_ID";
/// Environment variable holding the app client secret (optional).
pub const ENV_CLIENT_SECRET: &str = "AUTHKIT_CLIENT_SECRET";
/// Environment variable overriding the pool endpoint (optional).
pub const ENV_ENDPOINT: &str = "AUTHKIT_ENDPOINT";

/// Immutable settings for talking to one user pool through one app client.
///
/// Built once at process start and shared for the lifetime of the session
/// facade.
///
/// # Example
///
/// ```
/// use authkit_core::{SessionConfig, UserPoolId};
///
/// let pool = UserPoolId::new("eu-west-1_Example1").unwrap();
/// let config = SessionConfig::new(pool, "5x1clientid").unwrap();
/// assert_eq!(config.region(), "eu-west-1");
/// assert_eq!(config.endpoint().as_str(), "https://cognito-idp.eu-west-1.amazonaws.com/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
    region: String,
    user_pool_id: UserPoolId,
    client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_secret: Option<ClientSecret>,
    endpoint: PoolEndpoint,
}

#[derive(Deserialize)]
struct RawSessionConfig {
    region: Option<String>,
    user_pool_id: UserPoolId,
    client_id: String,
    client_secret: Option<ClientSecret>,
    endpoint: Option<PoolEndpoint>,
}

impl TryFrom<RawSessionConfig> for SessionConfig {
    type Error = Error;

    fn try_from(raw: RawSessionConfig) -> Result<Self> {
        let mut config = SessionConfig::new(raw.user_pool_id, raw.client_id)?;
        if let Some(region) = raw.region {
            config = config.with_region(region)?;
        }
        if let Some(endpoint) = raw.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(secret) = raw.client_secret {
            config = config.with_client_secret(secret);
        }
        Ok(config)
    }
}

impl SessionConfig {
    /// Create a configuration for the public Cognito endpoint of the pool's
    /// region.
    pub fn new(user_pool_id: UserPoolId, client_id: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(config_error(ENV_CLIENT_ID, "client id must not be empty"));
        }

        let region = user_pool_id.region().to_string();
        let endpoint = PoolEndpoint::for_region(&region)?;

        Ok(Self {
            region,
            user_pool_id,
            client_id,
            client_secret: None,
            endpoint,
        })
    }

    /// Override the region. The default endpoint follows the new region.
    pub fn with_region(mut self, region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        if region.trim().is_empty() {
            return Err(config_error(ENV_REGION, "region must not be empty"));
        }
        if self.endpoint == PoolEndpoint::for_region(&self.region)? {
            self.endpoint = PoolEndpoint::for_region(&region)?;
        }
        self.region = region;
        Ok(self)
    }

    pub fn with_client_secret(mut self, secret: ClientSecret) -> Self {
        self.client_secret = Some(secret);
        self
    }

    pub fn with_endpoint(mut self, endpoint: PoolEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Build a configuration from `AUTHKIT_*` environment variables.
    ///
    /// # Errors
    ///
    /// Fails if the pool id or client id is missing or malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup using the `AUTHKIT_*` names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pool = non_empty(ENV_USER_POOL_ID)
            .ok_or_else(|| config_error(ENV_USER_POOL_ID, "not set"))?;
        let client_id =
            non_empty(ENV_CLIENT_ID).ok_or_else(|| config_error(ENV_CLIENT_ID, "not set"))?;

        let mut config = SessionConfig::new(UserPoolId::new(pool)?, client_id)?;

        if let Some(region) = non_empty(ENV_REGION) {
            config = config.with_region(region)?;
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT) {
            config = config.with_endpoint(PoolEndpoint::new(endpoint)?);
        }
        if let Some(secret) = non_empty(ENV_CLIENT_SECRET) {
            config = config.with_client_secret(ClientSecret::new(secret));
        }

        Ok(config)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn user_pool_id(&self) -> &UserPoolId {
        &self.user_pool_id
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> Option<&ClientSecret> {
        self.client_secret.as_ref()
    }

    pub fn endpoint(&self) -> &PoolEndpoint {
        &self.endpoint
    }
}

fn config_error(key: &str, reason: &str) -> Error {
    InvalidInputError::Config {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
