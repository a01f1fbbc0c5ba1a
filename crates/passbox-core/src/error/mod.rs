//! Error types for the passbox core crate.
//!
//! Each module defines its own error enum; this module re-exports them all
//! for callers that want a single import path.

pub use crate::auth::AuthError;
pub use crate::codec::CodecError;
pub use crate::keystore::KeyStoreError;
pub use crate::path::PathError;
pub use crate::store::StoreError;
