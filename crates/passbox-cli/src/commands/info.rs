//! Info command - show store locations and status.
//!
//! # Examples
//!
//! ```bash
//! # Show store status in table format
//! passbox info
//!
//! # Output as JSON for scripting
//! passbox info --json
//! ```

use anyhow::Result;
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use passbox_core::auth::Authenticator;
use passbox_core::keystore::KeyStore;
use passbox_core::store::{SecretStore, StorePaths};

use crate::commands::create_table;

#[derive(ClapArgs)]
pub struct Args {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for the info command
#[derive(Serialize)]
struct StoreInfo {
    data_dir: String,
    key_present: bool,
    blob_present: bool,
    blob_bytes: Option<u64>,
    password_set: bool,
    top_level_entries: Option<usize>,
}

#[instrument(level = "info", name = "cmd::info", skip_all)]
pub fn execute(paths: &StorePaths, args: &Args) -> Result<()> {
    let key_present = KeyStore::new(paths.key_file()).exists();
    let blob_bytes = std::fs::metadata(paths.blob_file()).ok().map(|m| m.len());
    let password_set = Authenticator::new(paths.password_file()).password_is_set();

    // Only count entries when the store can actually be opened; a broken
    // blob should not make `info` itself fail.
    let top_level_entries = if key_present && blob_bytes.is_some() {
        SecretStore::open(paths.clone())
            .and_then(|store| store.show(None))
            .ok()
            .and_then(|value| value.as_object().map(|doc| doc.len()))
    } else {
        None
    };

    if args.json {
        let info = StoreInfo {
            data_dir: paths.root().display().to_string(),
            key_present,
            blob_present: blob_bytes.is_some(),
            blob_bytes,
            password_set,
            top_level_entries,
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let mut table = create_table();
        table.set_header(vec!["Property", "Value"]);
        table.add_row(vec!["Data directory", &paths.root().display().to_string()]);
        table.add_row(vec![
            "Encryption key",
            if key_present { "present" } else { "missing" },
        ]);
        table.add_row(vec![
            "Encrypted blob",
            &blob_bytes.map_or("missing".to_string(), |n| format!("{n} bytes")),
        ]);
        table.add_row(vec![
            "Master password",
            if password_set { "set" } else { "not set" },
        ]);
        table.add_row(vec![
            "Top-level entries",
            &top_level_entries.map_or("-".to_string(), |n| n.to_string()),
        ]);
        println!("{table}");
    }

    Ok(())
}
