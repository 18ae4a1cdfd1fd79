//! Refresh command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

pub async fn run(pool: &PoolArgs, _args: RefreshArgs) -> Result<()> {
    let session = session::open(pool).await?;

    let outcome = session.reauthenticate().await;

    // A rejected refresh signs the user out; save that too.
    session::persist(session)?;

    outcome.context("Failed to refresh session")?;

    output::success("Session refreshed");
    if let Some(user) = session.current_user() {
        output::field("Expires", &user.tokens.expires_at.to_rfc3339());
    }
    Ok(())
}
