//! CLI argument definitions.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use authkit::{ClientSecret, PoolEndpoint, SessionConfig, UserPoolId};

use crate::commands::{
    avatar_created, category, confirm_registration, confirm_reset, login, logout, refresh, register,
    request_reset, set_tokens, validate, whoami,
};

/// Authentication session CLI for Cognito and local user pools.
#[derive(Parser, Debug)]
#[command(name = "authkit")]
#[command(author, version = env!("AUTHKIT_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub pool: PoolArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which user pool to talk to.
///
/// Anything not given falls back to the configuration saved with the last
/// session.
#[derive(Args, Debug, Clone, Default)]
pub struct PoolArgs {
    /// Pool endpoint (https:// for Cognito, file:// for a local pool)
    #[arg(long, env = "AUTHKIT_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// AWS region; defaults to the user pool id's prefix
    #[arg(long, env = "AUTHKIT_REGION", global = true)]
    pub region: Option<String>,

    /// User pool id, e.g. us-east-1_AbCdEf123
    #[arg(long, env = "AUTHKIT_USER_POOL_ID", global = true)]
    pub user_pool_id: Option<String>,

    /// App client id
    #[arg(long, env = "AUTHKIT_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// App client secret, if the client has one
    #[arg(long, env = "AUTHKIT_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,
}

impl PoolArgs {
    /// Build a configuration from these arguments, layered over `saved`.
    ///
    /// Giving both the pool and the client starts a fresh configuration.
    /// Giving one of them keeps the rest of `saved`.
    pub fn resolve(&self, saved: Option<&SessionConfig>) -> Result<SessionConfig> {
        let mut config = match (&self.user_pool_id, &self.client_id, saved) {
            (Some(pool), Some(client), _) => {
                let pool = UserPoolId::new(pool).context("Invalid user pool id")?;
                SessionConfig::new(pool, client)?
            }
            (None, None, Some(saved)) => saved.clone(),
            (pool, client, Some(saved)) => {
                override_saved(saved, pool.as_deref(), client.as_deref())?
            }
            _ => anyhow::bail!(
                "No user pool configured. Pass --user-pool-id and --client-id \
                 (or set AUTHKIT_USER_POOL_ID and AUTHKIT_CLIENT_ID)."
            ),
        };

        if let Some(region) = &self.region {
            config = config.with_region(region)?;
        }
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(PoolEndpoint::new(endpoint).context("Invalid endpoint")?);
        }
        if let Some(secret) = &self.client_secret {
            config = config.with_client_secret(ClientSecret::new(secret));
        }

        Ok(config)
    }
}

fn override_saved(
    saved: &SessionConfig,
    pool: Option<&str>,
    client: Option<&str>,
) -> Result<SessionConfig> {
    let pool = match pool {
        Some(pool) => UserPoolId::new(pool).context("Invalid user pool id")?,
        None => saved.user_pool_id().clone(),
    };
    let same_pool = &pool == saved.user_pool_id();
    let mut config = SessionConfig::new(pool, client.unwrap_or(saved.client_id()))?;

    if same_pool {
        config = config.with_region(saved.region())?;
    }
    // A saved regional Cognito endpoint follows the pool; anything else is kept.
    if saved.endpoint() != &PoolEndpoint::for_region(saved.region())? {
        config = config.with_endpoint(saved.endpoint().clone());
    }
    if let Some(secret) = saved.client_secret() {
        config = config.with_client_secret(secret.clone());
    }
    Ok(config)
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check an email and password locally
    Validate(validate::ValidateArgs),

    /// Create an account
    Register(register::RegisterArgs),

    /// Confirm an account with the emailed code
    ConfirmRegistration(confirm_registration::ConfirmRegistrationArgs),

    /// Sign in and save the session
    Login(login::LoginArgs),

    /// Display the active session
    Whoami(whoami::WhoamiArgs),

    /// Refresh the session tokens
    Refresh(refresh::RefreshArgs),

    /// Sign out everywhere and clear the session
    Logout(logout::LogoutArgs),

    /// Send a password reset code
    RequestReset(request_reset::RequestResetArgs),

    /// Set a new password with a reset code
    ConfirmReset(confirm_reset::ConfirmResetArgs),

    /// Pass tokens from another identity provider to the pool client
    SetTokens(set_tokens::SetTokensArgs),

    /// Record that the user created an avatar
    AvatarCreated(avatar_created::AvatarCreatedArgs),

    /// Print the analytics category of the user
    Category(category::CategoryArgs),
}
