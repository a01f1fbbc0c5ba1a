use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args as ClapArgs;
use serde_json::Value;
use tracing::instrument;

use passbox_core::store::SecretStore;

#[derive(ClapArgs)]
pub struct Args {
    /// Plaintext JSON file to merge into the document
    pub file: PathBuf,
}

#[instrument(level = "info", name = "cmd::import", skip_all, fields(file = %args.file.display()))]
pub fn execute(store: &SecretStore, args: &Args) -> Result<()> {
    let raw = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let Value::Object(external) = parsed else {
        bail!(
            "{} does not contain a top-level JSON object",
            args.file.display()
        );
    };

    let count = external.len();
    store.import_merge(external)?;
    println!(
        "Merged {count} top-level {} from {}",
        if count == 1 { "entry" } else { "entries" },
        args.file.display()
    );
    Ok(())
}
