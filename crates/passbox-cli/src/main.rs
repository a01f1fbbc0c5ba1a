#![deny(unsafe_code)]

mod auth;
mod commands;
mod exit_code;

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use passbox_core::auth::AuthError;
use passbox_core::codec::CodecError;
use passbox_core::keystore::KeyStoreError;
use passbox_core::path::PathError;
use passbox_core::store::{StoreError, StorePaths};

use crate::commands::{
    completions, export, import, info, init, menu, passwd, rm, rotate, set, show,
};

/// Encrypted local secret store
#[derive(Parser)]
#[command(name = "passbox")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Store and read back a secret
    passbox set email/google hunter2
    passbox show email/google

    # Show the whole document
    passbox show

    # Script-friendly password handling
    echo \"$MASTER\" | passbox --password-stdin show

    # Interactive session
    passbox menu
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Data directory holding the key, blob and password hash
    #[arg(long, value_name = "DIR", global = true)]
    dir: Option<PathBuf>,

    /// Master password (insecure, prefer --password-stdin or PASSBOX_PASSWORD)
    #[arg(long, env = "PASSBOX_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Read the master password from stdin (single line)
    #[arg(long, conflicts_with = "password", global = true)]
    password_stdin: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Password options extracted from the CLI for the authentication gate
#[derive(Clone, Default)]
pub struct PasswordOptions {
    pub password: Option<String>,
    pub password_stdin: bool,
}

impl From<&Cli> for PasswordOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            password: cli.password.clone(),
            password_stdin: cli.password_stdin,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print a value, a subtree, or the whole document
    Show(show::Args),

    /// Add or update a value at a path
    Set(set::Args),

    /// Remove the entry at a path
    Rm(rm::Args),

    /// Merge a plaintext JSON file into the document
    Import(import::Args),

    /// Write the document to a plaintext JSON file
    Export(export::Args),

    /// Re-encrypt the document under a fresh key
    Rotate(rotate::Args),

    /// Generate the encryption key without storing anything yet
    Init(init::Args),

    /// Set or change the master password
    Passwd(passwd::Args),

    /// Show store locations and status
    Info(info::Args),

    /// Generate shell completions
    Completions(completions::Args),

    /// Interactive numbered menu (default when no subcommand is given)
    Menu(menu::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            let args: Vec<String> = std::env::args().collect();
            let is_quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let paths = resolve_store_paths(cli.dir.as_deref())?;
    let password_opts = PasswordOptions::from(&cli);
    let command = cli.command.unwrap_or(Commands::Menu(menu::Args {}));

    // The password gate, when set, must pass once before any document
    // operation. Completions need no store; passwd runs its own check.
    match command {
        Commands::Completions(args) => completions::execute(&args),
        Commands::Passwd(args) => passwd::execute(&paths, &password_opts, &args),
        Commands::Init(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            init::execute(&paths, &args)
        }
        Commands::Info(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            info::execute(&paths, &args)
        }
        Commands::Menu(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            menu::execute(&paths, &args)
        }
        Commands::Show(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            show::execute(&commands::open_store(&paths)?, &args)
        }
        Commands::Set(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            set::execute(&commands::open_or_init_store(&paths)?, &args)
        }
        Commands::Rm(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            rm::execute(&commands::open_store(&paths)?, &args)
        }
        Commands::Import(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            import::execute(&commands::open_or_init_store(&paths)?, &args)
        }
        Commands::Export(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            export::execute(&commands::open_store(&paths)?, &args)
        }
        Commands::Rotate(args) => {
            auth::ensure_authenticated(&paths, &password_opts)?;
            let mut store = commands::open_or_init_store(&paths)?;
            rotate::execute(&mut store, &args)
        }
    }
}

/// Resolve the data directory: `--dir` wins, otherwise the platform data dir.
fn resolve_store_paths(dir: Option<&Path>) -> Result<StorePaths> {
    let root = match dir {
        Some(d) => d.to_path_buf(),
        None => directories::ProjectDirs::from("", "", "passbox")
            .context("could not determine a data directory for this platform")?
            .data_dir()
            .to_path_buf(),
    };
    Ok(StorePaths::new(root))
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
///
/// This approach is more robust than string matching because it doesn't
/// depend on error message wording.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(auth_err) = cause.downcast_ref::<AuthError>() {
            match auth_err {
                AuthError::Unauthenticated | AuthError::NoPasswordSet => {
                    return exit_code::AUTH_FAILED;
                }
                _ => {}
            }
        }

        if let Some(codec_err) = cause.downcast_ref::<CodecError>() {
            if matches!(codec_err, CodecError::AuthenticationFailed) {
                return exit_code::AUTH_FAILED;
            }
        }

        if let Some(path_err) = cause.downcast_ref::<PathError>() {
            match path_err {
                PathError::NotFound { .. } => return exit_code::NOT_FOUND,
                PathError::InvalidPath { .. } | PathError::Conflict { .. } => {
                    return exit_code::INVALID_PATH;
                }
            }
        }

        // StoreError's transparent variants forward source() straight to the
        // inner error's source, so the wrapped KeyStoreError/CodecError/
        // PathError never show up as their own chain elements. They have to
        // be matched through the StoreError itself.
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            match store_err {
                StoreError::NoData => return exit_code::NOT_FOUND,
                StoreError::Key(KeyStoreError::NotFound(_)) => return exit_code::NOT_FOUND,
                StoreError::Codec(CodecError::AuthenticationFailed) => {
                    return exit_code::AUTH_FAILED;
                }
                StoreError::Path(PathError::NotFound { .. }) => return exit_code::NOT_FOUND,
                StoreError::Path(PathError::InvalidPath { .. } | PathError::Conflict { .. }) => {
                    return exit_code::INVALID_PATH;
                }
                _ => {}
            }
        }

        if let Some(key_err) = cause.downcast_ref::<KeyStoreError>() {
            if matches!(key_err, KeyStoreError::NotFound(_)) {
                return exit_code::NOT_FOUND;
            }
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                io::ErrorKind::PermissionDenied => return exit_code::GENERAL_ERROR,
                _ => {}
            }
        }
    }

    exit_code::GENERAL_ERROR
}
