//! End-to-end store behavior against real files in a temp directory.

use passbox_core::codec::{self, CodecError};
use passbox_core::keystore::KeyStore;
use passbox_core::store::{SecretStore, StorePaths, StoreError};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn full_lifecycle_with_rotation() {
    let temp = TempDir::new().unwrap();
    let paths = StorePaths::new(temp.path());

    let mut store = SecretStore::open_or_init(paths.clone()).unwrap();

    store.upsert("email/google", "secret1").unwrap();
    store.upsert("email/yahoo", "secret2").unwrap();

    assert_eq!(
        store.show(None).unwrap(),
        json!({"email": {"google": "secret1", "yahoo": "secret2"}})
    );

    store.delete("email/google").unwrap();
    assert_eq!(store.show(Some("email")).unwrap(), json!({"yahoo": "secret2"}));

    // Rotation must preserve the document, change the blob bytes, and
    // invalidate the old key.
    let old_key = KeyStore::new(paths.key_file()).load().unwrap();
    let blob_before = std::fs::read(paths.blob_file()).unwrap();

    store.rotate_key().unwrap();

    assert_eq!(
        store.show(None).unwrap(),
        json!({"email": {"yahoo": "secret2"}})
    );

    let blob_after = std::fs::read(paths.blob_file()).unwrap();
    assert_ne!(blob_before, blob_after);
    assert!(matches!(
        codec::open(&blob_after, &old_key),
        Err(CodecError::AuthenticationFailed)
    ));

    // The new persisted key still opens it.
    let new_key = KeyStore::new(paths.key_file()).load().unwrap();
    codec::open(&blob_after, &new_key).unwrap();
}

#[test]
fn reopening_the_store_reads_persisted_state() {
    let temp = TempDir::new().unwrap();
    let paths = StorePaths::new(temp.path());

    {
        let store = SecretStore::open_or_init(paths.clone()).unwrap();
        store.upsert("db/staging", "hunter2").unwrap();
    }

    let store = SecretStore::open(paths).unwrap();
    assert_eq!(store.show(Some("db/staging")).unwrap(), json!("hunter2"));
}

#[test]
fn export_then_import_round_trips() {
    let temp = TempDir::new().unwrap();

    let source = SecretStore::open_or_init(StorePaths::new(temp.path().join("src"))).unwrap();
    source.upsert("email/google", "secret1").unwrap();
    source.upsert("wifi", "hotspot-pass").unwrap();

    let dump = temp.path().join("dump.json");
    source.export(&dump).unwrap();

    // The export is plaintext JSON.
    let raw = std::fs::read_to_string(&dump).unwrap();
    assert!(raw.contains("secret1"));

    let dest = SecretStore::open_or_init(StorePaths::new(temp.path().join("dst"))).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let serde_json::Value::Object(external) = parsed else {
        panic!("export was not an object");
    };
    dest.import_merge(external).unwrap();

    assert_eq!(dest.show(None).unwrap(), source.show(None).unwrap());
}

#[test]
fn tampered_blob_fails_to_open() {
    let temp = TempDir::new().unwrap();
    let paths = StorePaths::new(temp.path());

    let store = SecretStore::open_or_init(paths.clone()).unwrap();
    store.upsert("a/b", "v").unwrap();

    let mut blob = std::fs::read(paths.blob_file()).unwrap();
    let last = blob.len() - 1;
    blob[last] ^= 0x80;
    std::fs::write(paths.blob_file(), &blob).unwrap();

    assert!(matches!(
        store.show(None),
        Err(StoreError::Codec(CodecError::AuthenticationFailed))
    ));
}

#[test]
fn failed_operation_leaves_previous_blob_intact() {
    let temp = TempDir::new().unwrap();
    let paths = StorePaths::new(temp.path());

    let store = SecretStore::open_or_init(paths.clone()).unwrap();
    store.upsert("email", "scalar").unwrap();
    let blob_before = std::fs::read(paths.blob_file()).unwrap();

    // Conflicts abort before any write.
    assert!(store.upsert("email/google", "v").is_err());
    assert_eq!(std::fs::read(paths.blob_file()).unwrap(), blob_before);
}
