//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(pool: &PoolArgs, _args: LogoutArgs) -> Result<()> {
    let session = session::open(pool).await?;

    let outcome = session.logout().await;

    session::persist(session)?;

    if let Err(err) = outcome {
        if session.current_user().is_none() && !matches!(err, authkit::Error::NoActiveSession) {
            output::warning("Signed out locally, but the pool did not confirm the sign-out");
        }
        return Err(err).context("Failed to logout");
    }

    output::success("Logged out");
    Ok(())
}
