use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use passbox_core::keystore::KeyStore;
use passbox_core::store::StorePaths;

#[derive(ClapArgs)]
pub struct Args {}

#[instrument(level = "info", name = "cmd::init", skip_all)]
pub fn execute(paths: &StorePaths, _args: &Args) -> Result<()> {
    let keystore = KeyStore::new(paths.key_file());
    if keystore.exists() {
        println!(
            "Store already initialized; key at {}",
            paths.key_file().display()
        );
        return Ok(());
    }

    keystore.generate()?;
    println!("Generated encryption key at {}", paths.key_file().display());
    println!("Consider setting a master password with 'passbox passwd'.");
    Ok(())
}
