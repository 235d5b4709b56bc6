//! Local filesystem storage backend.

use super::{StorageBackend, StorageError};
use actix_web::web;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;

/// Local filesystem storage backend.
pub struct LocalStorage {
    /// Directory receiving uploads
    base_path: PathBuf,
    /// Path of `base_path` relative to the static root
    public_prefix: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    ///
    /// The `base_path` directory will be created if it doesn't exist.
    pub fn new(base_path: PathBuf, public_prefix: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path)?;
        log::info!("LocalStorage initialized at {:?}", base_path);
        Ok(Self {
            base_path,
            public_prefix: public_prefix.trim_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn put_object(&self, data: Vec<u8>, filename: &str) -> Result<String, StorageError> {
        let path = self.base_path.join(filename);
        log::info!("LocalStorage: put_object: {:?}", path);

        web::block(move || fs::write(&path, data))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(format!("{}/{}", self.public_prefix, filename))
    }

    async fn delete_object(&self, stored_path: &str) -> Result<(), StorageError> {
        let filename = stored_path
            .strip_prefix(self.public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
            .ok_or_else(|| {
                StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a stored upload: {}", stored_path),
                ))
            })?;
        let path = self.base_path.join(filename);
        log::info!("LocalStorage: delete_object: {:?}", path);

        web::block(move || fs::remove_file(&path))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        Ok(())
    }
}
