//! Process exit codes, stable for scripting against the CLI.

pub const SUCCESS: u8 = 0;
pub const GENERAL_ERROR: u8 = 1;
/// Wrong master password, or the blob failed authentication.
pub const AUTH_FAILED: u8 = 3;
/// Key, document, or addressed path does not exist.
pub const NOT_FOUND: u8 = 4;
/// Malformed path, or a path conflicting with an existing scalar.
pub const INVALID_PATH: u8 = 5;
