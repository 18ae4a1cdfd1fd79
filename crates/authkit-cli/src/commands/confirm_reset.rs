//! Confirm-reset command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ConfirmResetArgs {
    /// Email address of the account
    #[arg(long)]
    pub email: String,

    /// Reset code from the email
    #[arg(long)]
    pub code: String,

    /// The new password
    #[arg(long)]
    pub new_password: String,
}

pub async fn run(pool: &PoolArgs, args: ConfirmResetArgs) -> Result<()> {
    let session = session::open(pool).await?;

    session
        .confirm_password_reset(&args.email, &args.code, &args.new_password)
        .await
        .context("Failed to reset password")?;

    output::success("Password changed");
    Ok(())
}
