//! Slash-delimited path addressing into the secret document.
//!
//! A path like `email/google` names the `google` entry inside the `email`
//! mapping. Resolution always produces the same (parent mapping, leaf key)
//! pair: write resolution creates missing intermediate mappings, read
//! resolution reports their absence instead.
//!
//! When a write path runs through an existing scalar (`email` holds a value
//! and the path is `email/google`), resolution fails with
//! [`PathError::Conflict`] rather than silently replacing the scalar with an
//! empty mapping.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::codec::Document;

/// Errors raised while parsing or resolving a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path is empty or contains an empty segment (leading, trailing,
    /// or doubled `/`).
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// A segment of the path does not exist, or an intermediate segment is
    /// not a nested mapping.
    #[error("path not found: no entry at '{prefix}'")]
    NotFound { prefix: String },

    /// An intermediate segment of a write path holds a scalar value.
    /// Creating the nested mapping would destroy it.
    #[error("path conflict: '{prefix}' holds a value, not a nested mapping")]
    Conflict { prefix: String },
}

/// A validated, non-empty path into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPath {
    segments: Vec<String>,
}

impl SecretPath {
    /// Parse a raw slash-delimited path.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidPath`] for an empty path or any empty segment,
    /// so `""`, `"a/"`, `"/a"` and `"a//b"` are all rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::InvalidPath {
                path: raw.to_owned(),
                reason: "path is empty",
            });
        }

        let segments: Vec<String> = raw.split('/').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::InvalidPath {
                path: raw.to_owned(),
                reason: "path contains an empty segment",
            });
        }

        Ok(Self { segments })
    }

    /// The final segment: the key within the parent mapping.
    pub fn leaf(&self) -> &str {
        // segments is non-empty by construction
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// All segments before the leaf.
    fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The joined path up to and including segment `n` (1-based), used in
    /// error messages.
    fn prefix(&self, n: usize) -> String {
        self.segments[..n].join("/")
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Walk to the parent mapping of `path`, creating missing intermediate
/// mappings on the way. Returns the parent; the leaf key is `path.leaf()`.
///
/// # Errors
///
/// [`PathError::Conflict`] when an intermediate segment holds a scalar.
pub fn resolve_for_write<'a>(
    root: &'a mut Document,
    path: &SecretPath,
) -> Result<&'a mut Document, PathError> {
    let mut current = root;
    for (i, segment) in path.parents().iter().enumerate() {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(map) => current = map,
            _ => {
                return Err(PathError::Conflict {
                    prefix: path.prefix(i + 1),
                });
            }
        }
    }
    Ok(current)
}

/// Walk to the parent mapping of `path` without creating anything.
///
/// # Errors
///
/// [`PathError::NotFound`] as soon as an intermediate segment is absent or
/// not a mapping.
pub fn resolve_for_read<'a>(
    root: &'a Document,
    path: &SecretPath,
) -> Result<&'a Document, PathError> {
    let mut current = root;
    for (i, segment) in path.parents().iter().enumerate() {
        match current.get(segment) {
            Some(Value::Object(map)) => current = map,
            _ => {
                return Err(PathError::NotFound {
                    prefix: path.prefix(i + 1),
                });
            }
        }
    }
    Ok(current)
}

/// Mutable twin of [`resolve_for_read`], used by delete. Same walk, same
/// failure behavior, no creation of intermediate mappings.
pub fn resolve_for_read_mut<'a>(
    root: &'a mut Document,
    path: &SecretPath,
) -> Result<&'a mut Document, PathError> {
    let mut current = root;
    for (i, segment) in path.parents().iter().enumerate() {
        match current.get_mut(segment) {
            Some(Value::Object(map)) => current = map,
            _ => {
                return Err(PathError::NotFound {
                    prefix: path.prefix(i + 1),
                });
            }
        }
    }
    Ok(current)
}
