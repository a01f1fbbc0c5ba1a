//! Master-password gate.
//!
//! The password itself is never stored; only a salted scrypt digest is. The
//! hash file holds `salt || digest` as raw bytes. Verification re-derives the
//! digest and compares in constant time, so a mismatch costs the same as a
//! match and timing reveals nothing about the stored digest.
//!
//! The gate is optional: a store without a hash file simply has no password.
//! When the hash file exists, callers must pass [`Authenticator::verify`]
//! once per session before reaching any document operation.

use std::io;
use std::path::{Path, PathBuf};

use rand::RngCore;
use scrypt::Params;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroize;

use crate::fsutil;

const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;
const HASH_FILE_LEN: usize = SALT_LEN + DIGEST_LEN;

// scrypt cost: N = 2^15, r = 8, p = 1. Roughly 100ms and 32 MiB per
// derivation, enough to make offline guessing expensive for an interactive
// tool.
const SCRYPT_LOG_N: u8 = 15;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Errors raised by the password gate.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No password hash file exists; verification cannot proceed until one
    /// is set.
    #[error("no master password has been set")]
    NoPasswordSet,

    /// The supplied password does not match the stored hash.
    ///
    /// Fatal for the session: the operator does not get past the gate.
    #[error("master password verification failed")]
    Unauthenticated,

    /// The hash file exists but has the wrong size.
    #[error("password hash file is malformed: expected {expected} bytes, got {actual}")]
    MalformedHashFile { expected: usize, actual: usize },

    /// scrypt rejected its parameters or output length.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Salted-hash password gate backed by a single file.
#[derive(Debug, Clone)]
pub struct Authenticator {
    hash_path: PathBuf,
}

impl Authenticator {
    pub fn new(hash_path: impl Into<PathBuf>) -> Self {
        Self {
            hash_path: hash_path.into(),
        }
    }

    /// Whether a master password has been set.
    pub fn password_is_set(&self) -> bool {
        self.hash_path.exists()
    }

    /// Derive a fresh salted hash for `plaintext` and persist it, replacing
    /// any prior hash atomically.
    pub fn set_password(&self, plaintext: &str) -> Result<(), AuthError> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);

        let mut digest = derive(plaintext, &salt)?;

        let mut file = [0u8; HASH_FILE_LEN];
        file[..SALT_LEN].copy_from_slice(&salt);
        file[SALT_LEN..].copy_from_slice(&digest);
        digest.zeroize();

        let result = fsutil::write_atomic_private(&self.hash_path, &file);
        file.zeroize();
        result?;

        tracing::info!("master password hash written to {}", self.hash_path.display());
        Ok(())
    }

    /// Check `plaintext` against the stored hash.
    ///
    /// # Errors
    ///
    /// * [`AuthError::NoPasswordSet`] when no hash file exists
    /// * [`AuthError::Unauthenticated`] when the password does not match
    pub fn verify(&self, plaintext: &str) -> Result<(), AuthError> {
        let stored = match std::fs::read(&self.hash_path) {
            Ok(stored) => stored,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(AuthError::NoPasswordSet);
            }
            Err(e) => return Err(AuthError::Io(e)),
        };

        if stored.len() != HASH_FILE_LEN {
            return Err(AuthError::MalformedHashFile {
                expected: HASH_FILE_LEN,
                actual: stored.len(),
            });
        }

        let (salt, expected) = stored.split_at(SALT_LEN);
        let mut digest = derive(plaintext, salt)?;
        let matches: bool = digest.as_slice().ct_eq(expected).into();
        digest.zeroize();

        if matches {
            Ok(())
        } else {
            Err(AuthError::Unauthenticated)
        }
    }

    pub fn path(&self) -> &Path {
        &self.hash_path
    }
}

fn derive(plaintext: &str, salt: &[u8]) -> Result<[u8; DIGEST_LEN], AuthError> {
    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, DIGEST_LEN)
        .map_err(|e| AuthError::KeyDerivation(e.to_string()))?;

    let mut digest = [0u8; DIGEST_LEN];
    scrypt::scrypt(plaintext.as_bytes(), salt, &params, &mut digest)
        .map_err(|e| AuthError::KeyDerivation(e.to_string()))?;
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verify_without_hash_signals_no_password_set() {
        let temp = TempDir::new().unwrap();
        let auth = Authenticator::new(temp.path().join("passwd.scrypt"));
        assert!(!auth.password_is_set());
        assert!(matches!(auth.verify("anything"), Err(AuthError::NoPasswordSet)));
    }

    #[test]
    fn test_set_then_verify() {
        let temp = TempDir::new().unwrap();
        let auth = Authenticator::new(temp.path().join("passwd.scrypt"));

        auth.set_password("correct horse battery staple").unwrap();
        assert!(auth.password_is_set());
        auth.verify("correct horse battery staple").unwrap();
    }

    #[test]
    fn test_wrong_password_is_unauthenticated() {
        let temp = TempDir::new().unwrap();
        let auth = Authenticator::new(temp.path().join("passwd.scrypt"));

        auth.set_password("right").unwrap();
        assert!(matches!(auth.verify("wrong"), Err(AuthError::Unauthenticated)));
    }

    #[test]
    fn test_set_password_overwrites_previous_hash() {
        let temp = TempDir::new().unwrap();
        let auth = Authenticator::new(temp.path().join("passwd.scrypt"));

        auth.set_password("old").unwrap();
        auth.set_password("new").unwrap();
        assert!(matches!(auth.verify("old"), Err(AuthError::Unauthenticated)));
        auth.verify("new").unwrap();
    }

    #[test]
    fn test_malformed_hash_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let hash_path = temp.path().join("passwd.scrypt");
        std::fs::write(&hash_path, [0u8; 5]).unwrap();

        let auth = Authenticator::new(&hash_path);
        assert!(matches!(
            auth.verify("anything"),
            Err(AuthError::MalformedHashFile {
                expected: 48,
                actual: 5
            })
        ));
    }
}
