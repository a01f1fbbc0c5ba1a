use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to show (omit to print the whole document)
    pub path: Option<String>,
}

#[instrument(level = "info", name = "cmd::show", skip_all, fields(path = args.path.as_deref().unwrap_or("<root>")))]
pub fn execute(store: &SecretStore, args: &Args) -> Result<()> {
    let value = store.show(args.path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
