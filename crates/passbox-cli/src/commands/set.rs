use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {
    /// Slash-delimited path, e.g. email/google
    pub path: String,

    /// Value to store (omit to be prompted with hidden input)
    pub value: Option<String>,
}

#[instrument(level = "info", name = "cmd::set", skip_all, fields(path = %args.path))]
pub fn execute(store: &SecretStore, args: &Args) -> Result<()> {
    let value = match &args.value {
        Some(value) => value.clone(),
        None => rpassword::prompt_password("Value: ")?,
    };

    store.upsert(&args.path, &value)?;
    println!("Stored value at '{}'", args.path);
    Ok(())
}
