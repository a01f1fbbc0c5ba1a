//! CLI subcommands and shared helpers.

pub mod completions;
pub mod export;
pub mod import;
pub mod info;
pub mod init;
pub mod menu;
pub mod passwd;
pub mod rm;
pub mod rotate;
pub mod set;
pub mod show;

use anyhow::Result;
use comfy_table::{ContentArrangement, Table, presets};

use passbox_core::keystore::{KeyStore, KeyStoreError};
use passbox_core::store::{SecretStore, StoreError, StorePaths};

/// Open the store, requiring an existing key.
pub fn open_store(paths: &StorePaths) -> Result<SecretStore> {
    match SecretStore::open(paths.clone()) {
        Ok(store) => Ok(store),
        Err(e @ StoreError::Key(KeyStoreError::NotFound(_))) => {
            Err(anyhow::Error::new(e).context(
                "no encryption key found - run 'passbox init' or store a value first",
            ))
        }
        Err(e) => Err(e.into()),
    }
}

/// Open the store, generating a key if none exists. Says so on stderr,
/// since silently minting key material would surprise the operator.
pub fn open_or_init_store(paths: &StorePaths) -> Result<SecretStore> {
    if !KeyStore::new(paths.key_file()).exists() {
        eprintln!(
            "No encryption key found; generating a new one at {}",
            paths.key_file().display()
        );
    }
    Ok(SecretStore::open_or_init(paths.clone())?)
}

pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}
