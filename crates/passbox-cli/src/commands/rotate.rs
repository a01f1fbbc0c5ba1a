use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {}

#[instrument(level = "info", name = "cmd::rotate", skip_all)]
pub fn execute(store: &mut SecretStore, _args: &Args) -> Result<()> {
    store.rotate_key()?;
    println!("Encryption key rotated; document re-encrypted under the new key.");
    Ok(())
}
