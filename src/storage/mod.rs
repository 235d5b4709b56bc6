//! Storage backend abstraction for proof uploads.

pub mod local;

use async_trait::async_trait;
use uuid::Uuid;

/// Longest sanitized client filename kept in a stored name.
const MAX_CLIENT_NAME_LEN: usize = 100;

/// Storage operation errors.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error
    Io(std::io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Trait for storage backends.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store a file under `filename`, which must already be a safe single path component.
    ///
    /// Returns the path relative to the static root, e.g. `uploads/<filename>`.
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<String, StorageError>;

    /// Remove a file previously stored, given the path `put_object` returned.
    async fn delete_object(&self, stored_path: &str) -> Result<(), StorageError>;
}

/// Derives a unique, path-safe stored name from a client-supplied filename.
///
/// Only the final path component survives, characters outside `[A-Za-z0-9._-]`
/// become `_`, leading dots are dropped, and a random prefix prevents two uploads
/// with the same client name from overwriting each other.
pub fn safe_upload_name(client_filename: &str) -> String {
    let base = client_filename
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    // Keep the tail so the extension survives truncation.
    let cleaned = if cleaned.len() > MAX_CLIENT_NAME_LEN {
        &cleaned[cleaned.len() - MAX_CLIENT_NAME_LEN..]
    } else {
        cleaned
    };
    let cleaned = if cleaned.is_empty() { "upload" } else { cleaned };

    format!("{}_{}", Uuid::new_v4().simple(), cleaned)
}
