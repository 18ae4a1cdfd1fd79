//! Request-reset command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestResetArgs {
    /// Email address of the account
    #[arg(long)]
    pub email: String,
}

pub async fn run(pool: &PoolArgs, args: RequestResetArgs) -> Result<()> {
    let session = session::open(pool).await?;

    let delivery = session
        .request_password_reset(&args.email)
        .await
        .context("Failed to request password reset")?;

    output::success("Reset code sent");
    if let Some(destination) = delivery.destination {
        output::field("Code sent to", &destination);
    }
    Ok(())
}
