//! crates/cms_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The web layer only talks to documents and credentials through these traits,
//! so the concrete file-system adapters can be swapped out in tests.

use async_trait::async_trait;

use crate::domain::{DocumentName, NameError};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// The `Display` text of the first three variants is shown to users verbatim.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0} does not exist.")]
    NotFound(String),
    #[error("{0} already exists. Please enter a different name.")]
    AlreadyExists(String),
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// A flat collection of named documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Names of all documents, sorted.
    async fn list(&self) -> PortResult<Vec<String>>;

    async fn exists(&self, name: &str) -> PortResult<bool>;

    /// Returns the raw content; `NotFound` if absent.
    async fn read(&self, name: &str) -> PortResult<String>;

    /// Writes a new document; `AlreadyExists` if the name is taken.
    async fn create(&self, name: &str, content: &str) -> PortResult<()>;

    /// Replaces the whole content, creating the document if needed.
    async fn write(&self, name: &str, content: &str) -> PortResult<()>;

    /// Removes a document; `NotFound` if absent.
    async fn delete(&self, name: &str) -> PortResult<()>;

    /// Checks whether `name` can be used for a new document.
    ///
    /// The extension rule runs first, then the base-name rule, then the
    /// existence check. The first failure is returned.
    async fn validate(&self, name: &str) -> PortResult<DocumentName> {
        let parsed = DocumentName::parse(name)?;
        if self.exists(parsed.as_str()).await? {
            return Err(PortError::AlreadyExists(parsed.to_string()));
        }
        Ok(parsed)
    }
}

/// Read-only username/password lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// True iff `username` is known and `password` matches its stored hash.
    async fn verify(&self, username: &str, password: &str) -> PortResult<bool>;
}
