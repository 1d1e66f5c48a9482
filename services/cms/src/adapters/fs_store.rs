//! services/cms/src/adapters/fs_store.rs
//!
//! The file-system adapter, the concrete implementation of the `DocumentStore`
//! port from the `core` crate. Every document is one file in a single flat
//! directory; the filename is the document name.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cms_core::domain::is_plain_file_name;
use cms_core::ports::{DocumentStore, PortError, PortResult};
use tokio::io::AsyncWriteExt;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A document store backed by a directory on disk.
#[derive(Clone, Debug)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    /// Opens the store, creating the directory if it does not exist yet.
    pub async fn open(root: impl Into<PathBuf>) -> PortResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a document name to its file, refusing anything that would
    /// escape the directory.
    fn path_for(&self, name: &str) -> PortResult<PathBuf> {
        if is_plain_file_name(name) {
            Ok(self.root.join(name))
        } else {
            Err(PortError::NotFound(name.to_string()))
        }
    }
}

/// Maps a missing file onto the port's `NotFound` and everything else onto `Io`.
fn not_found_or_io(name: &str, err: std::io::Error) -> PortError {
    match err.kind() {
        ErrorKind::NotFound => PortError::NotFound(name.to_string()),
        _ => PortError::Io(err),
    }
}

//=========================================================================================
// DocumentStore Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for FsDocumentStore {
    async fn list(&self) -> PortResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            // Dotfiles are not documents.
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    async fn exists(&self, name: &str) -> PortResult<bool> {
        if !is_plain_file_name(name) {
            return Ok(false);
        }
        match tokio::fs::metadata(self.root.join(name)).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PortError::Io(e)),
        }
    }

    async fn read(&self, name: &str) -> PortResult<String> {
        let path = self.path_for(name)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn create(&self, name: &str, content: &str) -> PortResult<()> {
        let path = self.path_for(name)?;
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => PortError::AlreadyExists(name.to_string()),
                _ => PortError::Io(e),
            })?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write(&self, name: &str, content: &str) -> PortResult<()> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> PortResult<()> {
        let path = self.path_for(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(name, e))
    }
}
