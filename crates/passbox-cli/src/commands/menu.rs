//! Interactive numbered menu - the default session surface.
//!
//! Every operation error is reported in plain text and the loop continues;
//! only quitting (or EOF on stdin) ends the session. The password gate has
//! already been passed in `main` before this runs.

use std::io::{self, Write};

use anyhow::{Result, bail};
use clap::Args as ClapArgs;
use serde_json::Value;

use passbox_core::keystore::KeyStore;
use passbox_core::store::{SecretStore, StorePaths};

use crate::commands;

#[derive(ClapArgs)]
pub struct Args {}

pub fn execute(paths: &StorePaths, _args: &Args) -> Result<()> {
    let mut store = match resolve_store(paths)? {
        Some(store) => store,
        None => return Ok(()),
    };

    loop {
        print_menu();
        let Some(choice) = read_line("Choose an option (1-7): ")? else {
            return Ok(());
        };

        match choice.trim() {
            "1" => {
                if show(&store)?.is_none() {
                    return Ok(());
                }
            }
            "2" => {
                if upsert(&store)?.is_none() {
                    return Ok(());
                }
            }
            "3" => {
                if delete(&store)?.is_none() {
                    return Ok(());
                }
            }
            "4" => {
                if import(&store)?.is_none() {
                    return Ok(());
                }
            }
            "5" => {
                if export(&store)?.is_none() {
                    return Ok(());
                }
            }
            "6" => {
                report(rotate(&mut store));
            }
            "7" | "q" | "quit" => {
                println!("Bye.");
                return Ok(());
            }
            other => println!("Invalid choice {other:?}, try again."),
        }
    }
}

fn print_menu() {
    println!();
    println!("=== passbox ===");
    println!(" 1) show a value or the whole document");
    println!(" 2) add or update a value");
    println!(" 3) delete a value");
    println!(" 4) import a plaintext JSON file");
    println!(" 5) export to a plaintext JSON file");
    println!(" 6) rotate the encryption key");
    println!(" 7) quit");
}

/// Open the store; when no key exists yet, ask the operator whether to
/// generate one. Returns `None` when the session should end.
fn resolve_store(paths: &StorePaths) -> Result<Option<SecretStore>> {
    if KeyStore::new(paths.key_file()).exists() {
        return commands::open_store(paths).map(Some);
    }

    let Some(answer) = read_line("No encryption key found. Generate a new one? [y/N]: ")? else {
        return Ok(None);
    };
    if answer.trim().eq_ignore_ascii_case("y") {
        commands::open_or_init_store(paths).map(Some)
    } else {
        bail!("cannot continue without an encryption key");
    }
}

// Each handler returns Ok(None) on EOF so the session loop can end cleanly.

fn show(store: &SecretStore) -> Result<Option<()>> {
    let Some(raw) = read_line("Path to show (empty for everything): ")? else {
        return Ok(None);
    };
    let raw = raw.trim();
    let path = if raw.is_empty() { None } else { Some(raw) };

    match store.show(path) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(e) => report_err(&e.into()),
    }
    Ok(Some(()))
}

fn upsert(store: &SecretStore) -> Result<Option<()>> {
    let Some(path) = read_line("Path (e.g. email/google): ")? else {
        return Ok(None);
    };
    let Some(value) = read_line("Value: ")? else {
        return Ok(None);
    };

    match store.upsert(path.trim(), &value) {
        Ok(()) => println!("Stored value at '{}'", path.trim()),
        Err(e) => report_err(&e.into()),
    }
    Ok(Some(()))
}

fn delete(store: &SecretStore) -> Result<Option<()>> {
    let Some(path) = read_line("Path to delete: ")? else {
        return Ok(None);
    };

    match store.delete(path.trim()) {
        Ok(()) => println!("Removed '{}'", path.trim()),
        Err(e) => report_err(&e.into()),
    }
    Ok(Some(()))
}

fn import(store: &SecretStore) -> Result<Option<()>> {
    let Some(file) = read_line("JSON file to import: ")? else {
        return Ok(None);
    };

    let result = std::fs::read_to_string(file.trim())
        .map_err(anyhow::Error::from)
        .and_then(|raw| Ok(serde_json::from_str::<Value>(&raw)?))
        .and_then(|parsed| match parsed {
            Value::Object(external) => {
                let count = external.len();
                store.import_merge(external)?;
                println!("Merged {count} top-level entries.");
                Ok(())
            }
            _ => bail!("file does not contain a top-level JSON object"),
        });
    report(result);
    Ok(Some(()))
}

fn export(store: &SecretStore) -> Result<Option<()>> {
    let Some(file) = read_line("Destination file for the plaintext export: ")? else {
        return Ok(None);
    };

    println!("Warning: the export is written as PLAINTEXT - every secret in it is readable.");
    match store.export(std::path::Path::new(file.trim())) {
        Ok(()) => println!("Exported document to {}", file.trim()),
        Err(e) => report_err(&e.into()),
    }
    Ok(Some(()))
}

fn rotate(store: &mut SecretStore) -> Result<()> {
    store.rotate_key()?;
    println!("Encryption key rotated; document re-encrypted under the new key.");
    Ok(())
}

fn report(result: Result<()>) {
    if let Err(e) = result {
        report_err(&e);
    }
}

fn report_err(e: &anyhow::Error) {
    println!("error: {e:#}");
}

/// Prompt and read one line. Returns `None` on EOF.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}
