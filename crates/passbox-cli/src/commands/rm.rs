use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to remove
    pub path: String,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(path = %args.path))]
pub fn execute(store: &SecretStore, args: &Args) -> Result<()> {
    store.delete(&args.path)?;
    println!("Removed '{}'", args.path);
    Ok(())
}
