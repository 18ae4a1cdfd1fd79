//! Set-tokens command implementation.

use anyhow::{Context, Result};
use clap::Args;

use authkit::TokenBundle;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct SetTokensArgs {
    /// Token as NAME=VALUE, e.g. accounts.google.com=eyJ... (repeatable)
    #[arg(long = "token", value_parser = parse_token)]
    pub tokens: Vec<(String, String)>,
}

fn parse_token(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    if name.is_empty() {
        return Err("token name is empty".to_string());
    }
    Ok((name.to_string(), value.to_string()))
}

pub async fn run(pool: &PoolArgs, args: SetTokensArgs) -> Result<()> {
    let session = session::open(pool).await?;

    let bundle: TokenBundle = args.tokens.into_iter().collect();
    let count = bundle.len();
    session.set_external_tokens(bundle);

    session::persist(session).context("Failed to save tokens")?;

    output::success(&format!("Stored {} external token(s)", count));
    for name in session.external_tokens().names() {
        output::field("Token", name);
    }
    Ok(())
}
