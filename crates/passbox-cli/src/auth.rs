//! Master-password gate for the CLI session.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};

use passbox_core::auth::Authenticator;
use passbox_core::store::StorePaths;

use crate::PasswordOptions;

/// Verify the master password once per process, if one is set.
///
/// A store without a password hash has no gate and passes straight through.
pub fn ensure_authenticated(paths: &StorePaths, opts: &PasswordOptions) -> Result<()> {
    let authenticator = Authenticator::new(paths.password_file());
    if !authenticator.password_is_set() {
        return Ok(());
    }

    let password = get_password(opts, "Master password: ")?;
    authenticator
        .verify(&password)
        .context("master password check failed")?;
    tracing::debug!("master password verified");
    Ok(())
}

/// Get a password using the priority chain:
/// 1. --password-stdin
/// 2. --password / PASSBOX_PASSWORD
/// 3. Interactive prompt
pub fn get_password(opts: &PasswordOptions, prompt: &str) -> Result<String> {
    if opts.password_stdin {
        read_password_from_stdin()
    } else if let Some(ref password) = opts.password {
        Ok(password.clone())
    } else {
        Ok(rpassword::prompt_password(prompt)?)
    }
}

/// Read a password from stdin (first line only)
pub fn read_password_from_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        anyhow::bail!(
            "--password-stdin requires the password to be piped in.\n\
             Example: echo \"$MASTER\" | passbox --password-stdin show"
        );
    }

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;

    let password = password.trim_end_matches('\n').trim_end_matches('\r');
    if password.is_empty() {
        anyhow::bail!("password from stdin is empty");
    }

    Ok(password.to_string())
}
