//! Category command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::PoolArgs;
use crate::session;

#[derive(Args, Debug)]
pub struct CategoryArgs {}

pub async fn run(pool: &PoolArgs, _args: CategoryArgs) -> Result<()> {
    let session = session::open(pool).await?;
    println!("{}", session.user_category_tag());
    Ok(())
}
