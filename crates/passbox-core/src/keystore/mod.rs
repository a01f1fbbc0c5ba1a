//! Master key lifecycle: generation, persistence, loading.
//!
//! The key is a random 32-byte AES-256-GCM key stored as raw bytes in a
//! dedicated file. It is the sole secret needed to decrypt the blob and is
//! never embedded in the document itself. This module is the only reader and
//! writer of the key file.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use rand::RngCore;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::fsutil;

/// Key length dictated by AES-256-GCM.
pub const KEY_LEN: usize = 32;

/// Errors that can occur while loading or persisting the master key.
#[derive(Error, Debug)]
pub enum KeyStoreError {
    /// The key file does not exist.
    ///
    /// Recoverable: the caller decides between generating a fresh key and
    /// aborting the requested operation.
    #[error("key file not found: {0}")]
    NotFound(PathBuf),

    /// The key file exists but does not hold exactly [`KEY_LEN`] bytes.
    #[error("key file has invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A 32-byte symmetric master key.
///
/// Zeroized on drop. Intentionally not `Clone`: exactly one live copy per
/// store, handed over on rotation.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    /// Generate a fresh random key from the OS entropy source.
    pub fn random() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Construct a key from raw bytes, taking ownership of them.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Owns the key file and mediates all access to it.
#[derive(Debug, Clone)]
pub struct KeyStore {
    key_path: PathBuf,
}

impl KeyStore {
    pub fn new(key_path: impl Into<PathBuf>) -> Self {
        Self {
            key_path: key_path.into(),
        }
    }

    /// Whether a key file is present.
    pub fn exists(&self) -> bool {
        self.key_path.exists()
    }

    /// Generate a new random key, persist it, and return it as the active key.
    pub fn generate(&self) -> Result<MasterKey, KeyStoreError> {
        let key = MasterKey::random();
        self.store(&key)?;
        tracing::info!("generated new master key at {}", self.key_path.display());
        Ok(key)
    }

    /// Persist an existing key, replacing any previous key file atomically.
    pub fn store(&self, key: &MasterKey) -> Result<(), KeyStoreError> {
        fsutil::write_atomic_private(&self.key_path, key.as_bytes())?;
        Ok(())
    }

    /// Load the persisted key.
    ///
    /// # Errors
    ///
    /// * [`KeyStoreError::NotFound`] when no key file exists
    /// * [`KeyStoreError::InvalidLength`] when the file is not exactly 32 bytes
    pub fn load(&self) -> Result<MasterKey, KeyStoreError> {
        let mut raw = match std::fs::read(&self.key_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(KeyStoreError::NotFound(self.key_path.clone()));
            }
            Err(e) => return Err(KeyStoreError::Io(e)),
        };

        if raw.len() != KEY_LEN {
            let actual = raw.len();
            raw.zeroize();
            return Err(KeyStoreError::InvalidLength {
                expected: KEY_LEN,
                actual,
            });
        }

        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(&raw);
        raw.zeroize();
        tracing::debug!("loaded master key from {}", self.key_path.display());
        Ok(MasterKey::from_bytes(bytes))
    }

    pub fn path(&self) -> &Path {
        &self.key_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_key_is_not_found() {
        let temp = TempDir::new().unwrap();
        let keystore = KeyStore::new(temp.path().join("master.key"));
        assert!(matches!(keystore.load(), Err(KeyStoreError::NotFound(_))));
    }

    #[test]
    fn test_generate_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let keystore = KeyStore::new(temp.path().join("master.key"));

        let generated = keystore.generate().unwrap();
        let loaded = keystore.load().unwrap();
        assert_eq!(generated.as_bytes(), loaded.as_bytes());
    }

    #[test]
    fn test_generate_twice_replaces_key() {
        let temp = TempDir::new().unwrap();
        let keystore = KeyStore::new(temp.path().join("master.key"));

        let first = keystore.generate().unwrap();
        let second = keystore.generate().unwrap();
        assert_ne!(first.as_bytes(), second.as_bytes());
        assert_eq!(keystore.load().unwrap().as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_truncated_key_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let key_path = temp.path().join("master.key");
        std::fs::write(&key_path, [0u8; 7]).unwrap();

        let keystore = KeyStore::new(&key_path);
        assert!(matches!(
            keystore.load(),
            Err(KeyStoreError::InvalidLength {
                expected: KEY_LEN,
                actual: 7
            })
        ));
    }
}
