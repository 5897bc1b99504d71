//! File-based storage.

use super::{LayoutStore, StorageError, StorageResult};
use crate::layout::LayoutDocument;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// File name used inside the default data directory.
pub const LAYOUT_FILE_NAME: &str = "layout.json";

/// Appended to the layout path to name its backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Stores the layout as a pretty-printed JSON file.
///
/// Saves go through a temp file in the same directory that is then renamed
/// over the target, so a crash mid-write leaves the previous layout intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create storage backed by `path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::Io(format!("Failed to create storage directory: {}", e))
                })?;
            }
        }
        Ok(Self { path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/deskpin/layout.json`
    /// On Windows: `%LOCALAPPDATA%\deskpin\layout.json`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("deskpin").join(LAYOUT_FILE_NAME))
    }

    /// Get the layout file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`LayoutStore::backup`] copies the layout (`layout.json.bak`).
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl LayoutStore for FileStorage {
    fn save(&self, document: &LayoutDocument) -> StorageResult<()> {
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(self.directory())
            .map_err(|e| StorageError::Io(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(json.as_bytes())
            .map_err(|e| StorageError::Io(format!("Failed to write temp file: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| StorageError::Io(format!("Failed to sync temp file: {}", e)))?;
        temp.persist(&self.path).map_err(|e| {
            StorageError::Io(format!("Failed to replace {}: {}", self.path.display(), e.error))
        })?;

        log::debug!("Saved layout to {}", self.path.display());
        Ok(())
    }

    fn load(&self) -> StorageResult<LayoutDocument> {
        if !self.path.exists() {
            return Err(StorageError::NotFound(self.path.display().to_string()));
        }

        let json = fs::read_to_string(&self.path).map_err(|e| {
            StorageError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        LayoutDocument::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn backup(&self) -> StorageResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let backup = self.backup_path();
        fs::copy(&self.path, &backup).map_err(|e| {
            StorageError::Io(format!(
                "Failed to copy {} to {}: {}",
                self.path.display(),
                backup.display(),
                e
            ))
        })?;
        log::warn!("Kept a copy of the previous layout at {}", backup.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;
    use crate::layout::{LayoutSnapshot, WidgetRecord, ZPolicy};
    use tempfile::tempdir;

    fn sample() -> LayoutDocument {
        LayoutDocument::new(
            LayoutSnapshot {
                widgets: vec![WidgetRecord {
                    id: "a1b2c3d4".into(),
                    kind: "clock".into(),
                    x: 100,
                    y: 100,
                    width: 220,
                    height: 220,
                    z_policy: ZPolicy::AlwaysOnTop,
                    click_through: false,
                    settings: Default::default(),
                }],
            },
            Preferences {
                snap_enabled: false,
                snap_threshold: 12,
            },
        )
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join(LAYOUT_FILE_NAME)).unwrap();

        storage.save(&sample()).unwrap();
        assert!(storage.exists());
        assert_eq!(storage.load().unwrap(), sample());
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join(LAYOUT_FILE_NAME)).unwrap();

        assert!(!storage.exists());
        assert!(matches!(storage.load(), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_creates_parent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deskpin").join(LAYOUT_FILE_NAME);
        let storage = FileStorage::new(&path).unwrap();

        storage.save(&sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_replaces_without_leftovers() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join(LAYOUT_FILE_NAME)).unwrap();

        storage.save(&LayoutDocument::default()).unwrap();
        storage.save(&sample()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(storage.load().unwrap(), sample());
    }

    #[test]
    fn test_backup_keeps_corrupt_file_across_saves() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LAYOUT_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        let storage = FileStorage::new(&path).unwrap();

        assert!(storage.backup().unwrap());
        storage.save(&sample()).unwrap();

        assert_eq!(storage.backup_path(), dir.path().join("layout.json.bak"));
        assert_eq!(fs::read_to_string(storage.backup_path()).unwrap(), "{ not json");
        assert_eq!(storage.load().unwrap(), sample());
    }

    #[test]
    fn test_backup_without_file_is_noop() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join(LAYOUT_FILE_NAME)).unwrap();

        assert!(!storage.backup().unwrap());
        assert!(!storage.backup_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(LAYOUT_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        let storage = FileStorage::new(&path).unwrap();

        assert!(matches!(storage.load(), Err(StorageError::Serialization(_))));
    }
}
