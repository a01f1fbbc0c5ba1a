//! Document operations composing the key store, codec and path navigator.
//!
//! [`SecretStore`] is the explicit per-session context: it owns the file
//! locations and the loaded master key, nothing else. There is no in-memory
//! document cache; every operation decrypts the blob, transforms the
//! document and re-encrypts it, and every file replacement is atomic, so a
//! failure mid-operation leaves the previous state on disk.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::codec::{self, CodecError, Document};
use crate::fsutil;
use crate::keystore::{KeyStore, KeyStoreError, MasterKey};
use crate::path::{self, PathError, SecretPath};

/// File layout of a store: one directory holding the key, the encrypted
/// blob and the optional password hash.
#[derive(Debug, Clone)]
pub struct StorePaths {
    root: PathBuf,
}

impl StorePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Raw 32-byte master key.
    pub fn key_file(&self) -> PathBuf {
        self.root.join("master.key")
    }

    /// AES-256-GCM sealed document.
    pub fn blob_file(&self) -> PathBuf {
        self.root.join("secrets.enc")
    }

    /// Salted scrypt hash of the master password.
    pub fn password_file(&self) -> PathBuf {
        self.root.join("passwd.scrypt")
    }
}

/// Errors surfaced by document operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No blob has been persisted yet. A valid initial state, reported so
    /// the caller can phrase it for the operator.
    #[error("no secret document has been stored yet")]
    NoData,

    /// The document to import was not a top-level mapping.
    #[error("imported document must be a top-level object")]
    NotAnObject,

    #[error(transparent)]
    Key(#[from] KeyStoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// An unlocked secret store: file locations plus the active master key.
pub struct SecretStore {
    paths: StorePaths,
    key: MasterKey,
}

impl SecretStore {
    /// Open a store with an existing key.
    ///
    /// # Errors
    ///
    /// [`KeyStoreError::NotFound`] (wrapped in [`StoreError::Key`]) when no
    /// key file exists; the caller decides whether to fall back to
    /// [`SecretStore::open_or_init`].
    pub fn open(paths: StorePaths) -> Result<Self, StoreError> {
        let key = KeyStore::new(paths.key_file()).load()?;
        Ok(Self { paths, key })
    }

    /// Open a store, generating and persisting a fresh key if none exists.
    pub fn open_or_init(paths: StorePaths) -> Result<Self, StoreError> {
        let keystore = KeyStore::new(paths.key_file());
        let key = match keystore.load() {
            Ok(key) => key,
            Err(KeyStoreError::NotFound(_)) => keystore.generate()?,
            Err(e) => return Err(e.into()),
        };
        Ok(Self { paths, key })
    }

    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    /// Return the whole document (`path` = `None`) or the value at `path`.
    ///
    /// An absent blob reads as an empty document, so `show(None)` on a fresh
    /// store returns `{}` while any `show(Some(_))` fails with path-not-found.
    pub fn show(&self, raw_path: Option<&str>) -> Result<Value, StoreError> {
        match raw_path {
            None => Ok(Value::Object(self.load_or_empty()?)),
            Some(raw) => {
                let secret_path = SecretPath::parse(raw)?;
                let document = self.load_or_empty()?;
                let parent = path::resolve_for_read(&document, &secret_path)?;
                parent
                    .get(secret_path.leaf())
                    .cloned()
                    .ok_or_else(|| not_found(&secret_path))
            }
        }
    }

    /// Insert or replace the scalar value at `path`, creating intermediate
    /// mappings as needed. Starts from an empty document when nothing has
    /// been persisted yet.
    pub fn upsert(&self, raw_path: &str, value: &str) -> Result<(), StoreError> {
        let secret_path = SecretPath::parse(raw_path)?;
        let mut document = self.load_or_empty()?;

        let parent = path::resolve_for_write(&mut document, &secret_path)?;
        parent.insert(
            secret_path.leaf().to_owned(),
            Value::String(value.to_owned()),
        );

        self.persist(&document)?;
        tracing::debug!(path = %secret_path, "value upserted");
        Ok(())
    }

    /// Remove the entry at `path`.
    ///
    /// # Errors
    ///
    /// * [`StoreError::NoData`] when nothing has been persisted
    /// * [`PathError::NotFound`] when the path or its leaf is absent
    pub fn delete(&self, raw_path: &str) -> Result<(), StoreError> {
        let secret_path = SecretPath::parse(raw_path)?;
        let mut document = self.load()?;

        let parent = path::resolve_for_read_mut(&mut document, &secret_path)?;
        if parent.remove(secret_path.leaf()).is_none() {
            return Err(not_found(&secret_path));
        }

        self.persist(&document)?;
        tracing::debug!(path = %secret_path, "entry deleted");
        Ok(())
    }

    /// Shallow-merge `external` into the current document: external
    /// top-level keys overwrite same-named keys wholesale, no deep merge.
    pub fn import_merge(&self, external: Document) -> Result<(), StoreError> {
        let mut document = self.load_or_empty()?;
        let merged = external.len();
        for (key, value) in external {
            document.insert(key, value);
        }

        self.persist(&document)?;
        tracing::debug!(top_level_keys = merged, "external document merged");
        Ok(())
    }

    /// Write the decrypted document as pretty-printed plaintext JSON.
    ///
    /// This deliberately crosses the secrecy boundary; the caller is
    /// responsible for telling the operator so.
    pub fn export(&self, out: &Path) -> Result<(), StoreError> {
        let document = self.load()?;
        let mut rendered = serde_json::to_vec_pretty(&document).map_err(CodecError::Serialize)?;
        rendered.push(b'\n');
        std::fs::write(out, rendered)?;
        tracing::info!(file = %out.display(), "document exported as plaintext");
        Ok(())
    }

    /// Re-encrypt the document under a fresh key and discard the old key.
    ///
    /// The new blob is sealed before any file is touched; the key file is
    /// replaced first, then the blob. A crash between the two replacements
    /// leaves the blob sealed under the discarded key, which is the
    /// accepted residual risk of running without a journal.
    pub fn rotate_key(&mut self) -> Result<(), StoreError> {
        let document = self.load_or_empty()?;

        let new_key = MasterKey::random();
        let blob = codec::seal(&document, &new_key)?;

        KeyStore::new(self.paths.key_file()).store(&new_key)?;
        fsutil::write_atomic(&self.paths.blob_file(), &blob)?;

        self.key = new_key;
        tracing::info!("master key rotated, document re-encrypted");
        Ok(())
    }

    /// Decrypt the persisted document.
    fn load(&self) -> Result<Document, StoreError> {
        let blob = match std::fs::read(self.paths.blob_file()) {
            Ok(blob) => blob,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NoData),
            Err(e) => return Err(e.into()),
        };
        Ok(codec::open(&blob, &self.key)?)
    }

    fn load_or_empty(&self) -> Result<Document, StoreError> {
        match self.load() {
            Ok(document) => Ok(document),
            Err(StoreError::NoData) => Ok(Document::new()),
            Err(e) => Err(e),
        }
    }

    /// Seal and atomically replace the blob file.
    fn persist(&self, document: &Document) -> Result<(), StoreError> {
        let blob = codec::seal(document, &self.key)?;
        fsutil::write_atomic(&self.paths.blob_file(), &blob)?;
        Ok(())
    }
}

fn not_found(path: &SecretPath) -> StoreError {
    PathError::NotFound {
        prefix: path.to_string(),
    }
    .into()
}
