//! Subcommand implementations.

pub mod avatar_created;
pub mod category;
pub mod confirm_registration;
pub mod confirm_reset;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod request_reset;
pub mod set_tokens;
pub mod validate;
pub mod whoami;

use anyhow::Result;

use crate::cli::{Commands, PoolArgs};

pub async fn handle(pool: PoolArgs, command: Commands) -> Result<()> {
    match command {
        Commands::Validate(args) => validate::run(args),
        Commands::Register(args) => register::run(&pool, args).await,
        Commands::ConfirmRegistration(args) => confirm_registration::run(&pool, args).await,
        Commands::Login(args) => login::run(&pool, args).await,
        Commands::Whoami(args) => whoami::run(&pool, args).await,
        Commands::Refresh(args) => refresh::run(&pool, args).await,
        Commands::Logout(args) => logout::run(&pool, args).await,
        Commands::RequestReset(args) => request_reset::run(&pool, args).await,
        Commands::ConfirmReset(args) => confirm_reset::run(&pool, args).await,
        Commands::SetTokens(args) => set_tokens::run(&pool, args).await,
        Commands::AvatarCreated(args) => avatar_created::run(&pool, args).await,
        Commands::Category(args) => category::run(&pool, args).await,
    }
}
