//! In-memory storage implementation.

use super::{LayoutStore, StorageError, StorageResult};
use crate::layout::LayoutDocument;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RwLock<Option<LayoutDocument>>,
    backup: RwLock<Option<LayoutDocument>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds a document.
    pub fn with_document(document: LayoutDocument) -> Self {
        Self {
            document: RwLock::new(Some(document)),
            ..Self::default()
        }
    }

    /// The document captured by the last [`LayoutStore::backup`].
    pub fn backup_document(&self) -> Option<LayoutDocument> {
        self.backup.read().ok().and_then(|slot| slot.clone())
    }
}

impl LayoutStore for MemoryStorage {
    fn save(&self, document: &LayoutDocument) -> StorageResult<()> {
        let mut slot = self
            .document
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *slot = Some(document.clone());
        Ok(())
    }

    fn load(&self) -> StorageResult<LayoutDocument> {
        let slot = self
            .document
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        slot.clone()
            .ok_or_else(|| StorageError::NotFound("memory".to_string()))
    }

    fn exists(&self) -> bool {
        self.document.read().is_ok_and(|slot| slot.is_some())
    }

    fn backup(&self) -> StorageResult<bool> {
        let current = self
            .document
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?
            .clone();
        let Some(current) = current else {
            return Ok(false);
        };
        let mut slot = self
            .backup
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        *slot = Some(current);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;

    #[test]
    fn test_memory_storage_save_load() {
        let storage = MemoryStorage::new();
        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::NotFound(_))));

        let doc = LayoutDocument {
            preferences: Preferences {
                snap_enabled: false,
                snap_threshold: 4,
            },
            ..Default::default()
        };
        storage.save(&doc).unwrap();
        assert!(storage.exists());
        assert_eq!(storage.load().unwrap(), doc);
    }

    #[test]
    fn test_memory_storage_backup_survives_save() {
        let storage = MemoryStorage::new();
        assert!(!storage.backup().unwrap());
        assert!(storage.backup_document().is_none());

        let original = LayoutDocument {
            preferences: Preferences {
                snap_enabled: false,
                snap_threshold: 3,
            },
            ..Default::default()
        };
        storage.save(&original).unwrap();
        assert!(storage.backup().unwrap());
        storage.save(&LayoutDocument::default()).unwrap();

        assert_eq!(storage.backup_document(), Some(original));
    }

    #[test]
    fn test_memory_storage_overwrites() {
        let storage = MemoryStorage::with_document(LayoutDocument::default());
        let doc = LayoutDocument {
            preferences: Preferences {
                snap_enabled: true,
                snap_threshold: 16,
            },
            ..Default::default()
        };
        storage.save(&doc).unwrap();
        assert_eq!(storage.load().unwrap().preferences.snap_threshold, 16);
    }
}
