//! crates/cms_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These types are independent of HTTP, the file system, or any serialization format.

use std::fmt;

/// The kinds of document the CMS can store, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Markdown,
    PlainText,
}

impl DocumentKind {
    /// Maps an extension (without the leading dot) to a document kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Reasons a filename is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Files must be either plain text (.txt) or markdown (.md).")]
    UnsupportedExtension,
    #[error("Filename must have at least one character.")]
    EmptyName,
    #[error("Filename must not contain a path separator.")]
    PathSeparator,
    #[error("Filename must not start with a dot.")]
    Hidden,
}

/// A document filename with a legal extension and a non-empty base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentName {
    name: String,
    kind: DocumentKind,
}

impl DocumentName {
    /// Parses a filename, checking the extension before the base name.
    ///
    /// The extension is whatever follows the last `.`, so `notes.tar.md` is a
    /// markdown document and `.txt` is a plain-text name with an empty base.
    pub fn parse(name: &str) -> Result<Self, NameError> {
        let (stem, ext) = name
            .rsplit_once('.')
            .ok_or(NameError::UnsupportedExtension)?;
        let kind = DocumentKind::from_extension(ext).ok_or(NameError::UnsupportedExtension)?;

        if stem.is_empty() {
            return Err(NameError::EmptyName);
        }
        if !is_plain_file_name(name) {
            return Err(NameError::PathSeparator);
        }
        // Dotfiles are left out of listings, so they cannot be documents.
        if name.starts_with('.') {
            return Err(NameError::Hidden);
        }

        Ok(Self {
            name: name.to_string(),
            kind,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// True if `name` names an entry directly inside a directory: not empty,
/// not `.` or `..`, and free of path separators.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
