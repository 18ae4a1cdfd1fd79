//! Validate command implementation.

use anyhow::Result;
use clap::Args;

use authkit::AuthSession;

use crate::output;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Email address
    #[arg(long, default_value = "")]
    pub email: String,

    /// Password
    #[arg(long, default_value = "")]
    pub password: String,

    /// Password confirmation; compared only when given
    #[arg(long, default_value = "")]
    pub confirm: String,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let result = AuthSession::validate(&args.email, &args.password, &args.confirm);

    output::field("Result", result.as_str());

    if !result.is_valid() {
        anyhow::bail!("{}", result);
    }
    Ok(())
}
