//! Register command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Email address to register
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(pool: &PoolArgs, args: RegisterArgs) -> Result<()> {
    let session = session::open(pool).await?;

    eprintln!("{}", "Registering...".dimmed());

    let signed_up = session
        .register(&args.email, &args.password)
        .await
        .context("Failed to register")?;

    session::persist(session)?;

    output::success("Account created");
    println!();
    output::field("Sub", &signed_up.user_sub);
    output::field("Confirmed", &signed_up.confirmed.to_string());
    if let Some(delivery) = signed_up.delivery {
        if let Some(destination) = delivery.destination {
            output::field("Code sent to", &destination);
        }
        if let Some(medium) = delivery.medium {
            output::field("Medium", &medium);
        }
    }

    Ok(())
}
