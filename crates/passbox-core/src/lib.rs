#![forbid(unsafe_code)]

//! Core library for passbox, a local encrypted secret store.
//!
//! The document is a nested mapping of string keys to scalar secrets,
//! addressed by slash-delimited paths such as `email/google`. It is sealed
//! with AES-256-GCM under a random master key that lives in its own file;
//! an optional scrypt-hashed master password gates access on top of that.
//!
//! The store is strictly single-operator: every operation decrypts the whole
//! blob, transforms it in memory and atomically rewrites it. Two processes
//! pointed at the same data directory race last-writer-wins; that is a
//! documented limitation, not a supported mode.

pub mod auth;
pub mod codec;
pub mod error;
mod fsutil;
pub mod keystore;
pub mod path;
pub mod store;

pub use codec::Document;
pub use keystore::MasterKey;
pub use store::{SecretStore, StorePaths};
