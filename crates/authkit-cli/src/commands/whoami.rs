//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct Whoami<'a> {
    username: &'a str,
    user_pool_id: &'a str,
    endpoint: &'a str,
    signed_in: bool,
    expires_at: String,
    category: &'static str,
}

pub async fn run(pool: &PoolArgs, args: WhoamiArgs) -> Result<()> {
    let session = session::open(pool).await?;

    let user = session
        .current_user()
        .context("No active session. Run 'authkit login' first.")?;

    let whoami = Whoami {
        username: &user.username,
        user_pool_id: session.config().user_pool_id().as_str(),
        endpoint: session.config().endpoint().as_str(),
        signed_in: session.is_signed_in(),
        expires_at: user.tokens.expires_at.to_rfc3339(),
        category: session.user_category_tag(),
    };

    if args.json {
        return output::json_pretty(&whoami);
    }

    output::field("User", whoami.username);
    output::field("Pool", whoami.user_pool_id);
    output::field("Endpoint", whoami.endpoint);
    output::field("Signed in", &whoami.signed_in.to_string());
    output::field("Expires", &whoami.expires_at);
    output::field("Category", whoami.category);

    Ok(())
}
