use anyhow::{Context, Result, bail};
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::auth::Authenticator;
use passbox_core::store::StorePaths;

use crate::PasswordOptions;
use crate::auth::{get_password, read_password_from_stdin};

#[derive(ClapArgs)]
pub struct Args {
    /// Read the new password from stdin (single line) instead of prompting
    #[arg(long)]
    pub stdin: bool,
}

/// Set or change the master password. When one is already set, the current
/// password must be verified first (via the usual priority chain).
#[instrument(level = "info", name = "cmd::passwd", skip_all)]
pub fn execute(paths: &StorePaths, opts: &PasswordOptions, args: &Args) -> Result<()> {
    let authenticator = Authenticator::new(paths.password_file());

    if authenticator.password_is_set() {
        let current = get_password(opts, "Current master password: ")?;
        authenticator
            .verify(&current)
            .context("current master password check failed")?;
    }

    let new = if args.stdin {
        read_password_from_stdin()?
    } else {
        let first = rpassword::prompt_password("New master password: ")?;
        let second = rpassword::prompt_password("Repeat new master password: ")?;
        if first != second {
            bail!("passwords do not match");
        }
        first
    };

    if new.is_empty() {
        bail!("master password must not be empty");
    }

    authenticator.set_password(&new)?;
    println!("Master password updated.");
    Ok(())
}
