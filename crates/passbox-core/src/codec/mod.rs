//! Document serialization and authenticated encryption.
//!
//! A document is serialized as JSON and sealed with AES-256-GCM. The blob
//! layout is `nonce (12 bytes) || ciphertext || tag`; the GCM tag covers both
//! integrity and key binding, so tampering and wrong-key decryption are
//! indistinguishable and both surface as [`CodecError::AuthenticationFailed`].

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use serde_json::Value;
use thiserror::Error;
use zeroize::Zeroize;

use crate::keystore::MasterKey;

/// The nested secret mapping: string keys to scalars or further mappings.
pub type Document = serde_json::Map<String, Value>;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Errors that can occur while sealing or opening a blob.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Decryption failed: the blob was tampered with, truncated, or sealed
    /// under a different key. The document cannot be recovered without the
    /// matching key.
    #[error("blob authentication failed: wrong key or tampered data")]
    AuthenticationFailed,

    /// Decryption succeeded but the plaintext is not a valid document.
    #[error("decrypted payload is not a valid secret document: {0}")]
    Corrupt(String),

    /// The document could not be serialized.
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The cipher rejected the plaintext. Only reachable for payloads far
    /// beyond any realistic document size.
    #[error("encryption failed: payload too large")]
    SealFailed,
}

/// Serialize `document` and seal it under `key`.
///
/// Each call uses a fresh random nonce, so sealing the same document twice
/// produces different blobs.
pub fn seal(document: &Document, key: &MasterKey) -> Result<Vec<u8>, CodecError> {
    let mut plaintext = serde_json::to_vec(document).map_err(CodecError::Serialize)?;

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| CodecError::SealFailed);
    plaintext.zeroize();
    let ciphertext = ciphertext?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a sealed blob and deserialize the document.
///
/// # Errors
///
/// * [`CodecError::AuthenticationFailed`] on tamper, truncation, or key
///   mismatch
/// * [`CodecError::Corrupt`] when the decrypted plaintext does not parse as
///   a top-level JSON object
pub fn open(blob: &[u8], key: &MasterKey) -> Result<Document, CodecError> {
    if blob.len() < NONCE_LEN {
        return Err(CodecError::AuthenticationFailed);
    }
    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    let mut plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map_err(|_| CodecError::AuthenticationFailed)?;

    let parsed = serde_json::from_slice::<Value>(&plaintext);
    plaintext.zeroize();

    match parsed {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(CodecError::Corrupt(format!(
            "expected a top-level object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(CodecError::Corrupt(e.to_string())),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
