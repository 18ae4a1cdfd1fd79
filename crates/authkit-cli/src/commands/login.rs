//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Email address to sign in with
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(pool: &PoolArgs, args: LoginArgs) -> Result<()> {
    let session = session::open(pool).await?;

    eprintln!("{}", "Logging in...".dimmed());

    session
        .login(&args.email, &args.password)
        .await
        .context("Failed to login")?;

    session::persist(session)?;

    output::success("Logged in successfully");
    println!();
    if let Some(user) = session.current_user() {
        output::field("User", &user.username);
    }
    output::field("Pool", session.config().user_pool_id().as_str());
    output::field("Endpoint", session.config().endpoint().as_str());

    Ok(())
}
