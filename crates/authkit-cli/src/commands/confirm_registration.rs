//! Confirm-registration command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ConfirmRegistrationArgs {
    /// Email address the account was registered with
    #[arg(long)]
    pub email: String,

    /// Confirmation code from the email
    #[arg(long)]
    pub code: String,
}

pub async fn run(pool: &PoolArgs, args: ConfirmRegistrationArgs) -> Result<()> {
    let session = session::open(pool).await?;

    session
        .confirm_registration(&args.email, &args.code)
        .await
        .context("Failed to confirm registration")?;

    session::persist(session)?;

    output::success("Account confirmed");
    Ok(())
}
