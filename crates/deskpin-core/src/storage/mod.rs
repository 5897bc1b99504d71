//! Storage abstraction for the persisted layout.

mod file;
mod memory;

pub use file::{FileStorage, BACKUP_SUFFIX, LAYOUT_FILE_NAME};
pub use memory::MemoryStorage;

use crate::layout::LayoutDocument;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Layout not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Backend holding the single layout document.
///
/// Writes must be atomic: a reader never observes a half-written document.
pub trait LayoutStore: Send + Sync {
    /// Save the document, replacing any previous one.
    fn save(&self, document: &LayoutDocument) -> StorageResult<()>;

    /// Load the document. Returns [`StorageError::NotFound`] on first run.
    fn load(&self) -> StorageResult<LayoutDocument>;

    /// Check if a document has been saved.
    fn exists(&self) -> bool;

    /// Copy whatever is stored aside, byte for byte, so a later save cannot
    /// destroy it. Returns false when there was nothing to copy.
    fn backup(&self) -> StorageResult<bool>;
}
