//! Avatar-created command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::PoolArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct AvatarCreatedArgs {}

pub async fn run(pool: &PoolArgs, _args: AvatarCreatedArgs) -> Result<()> {
    let session = session::open(pool).await?;

    session.record_avatar_created();
    session::persist(session)?;

    output::success("Avatar recorded");
    output::field("Category", session.user_category_tag());
    Ok(())
}
