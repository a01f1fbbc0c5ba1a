use std::path::PathBuf;

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {
    /// Destination file for the plaintext JSON export
    pub file: PathBuf,
}

#[instrument(level = "info", name = "cmd::export", skip_all, fields(file = %args.file.display()))]
pub fn execute(store: &SecretStore, args: &Args) -> Result<()> {
    eprintln!("Warning: the export is written as PLAINTEXT - every secret in it is readable.");
    store.export(&args.file)?;
    println!("Exported document to {}", args.file.display());
    Ok(())
}
