use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::backup_location;

/// Mount state of the storage that holds backup files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageState {
    Mounted,
    MountedReadOnly,
    Unmounted,
}

impl StorageState {
    pub fn is_readable(self) -> bool {
        matches!(self, StorageState::Mounted | StorageState::MountedReadOnly)
    }
}

pub trait StorageProbe: Send + Sync {
    /// Current mount state. Cheap enough to call on the caller's thread.
    fn state(&self) -> StorageState;

    fn root(&self) -> &Path;

    fn resolve(&self, folder: &Path, filename: &str) -> PathBuf {
        backup_location(self.root(), folder, filename)
    }
}

/// A plain directory standing in for removable storage.
///
/// Missing directory reads as unmounted; a directory without write
/// permission reads as mounted read-only.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl StorageProbe for LocalStorage {
    fn state(&self) -> StorageState {
        match fs::metadata(&self.root) {
            Ok(md) if md.is_dir() => {
                if md.permissions().readonly() {
                    StorageState::MountedReadOnly
                } else {
                    StorageState::Mounted
                }
            }
            _ => StorageState::Unmounted,
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_directory_is_mounted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path());
        assert_eq!(storage.state(), StorageState::Mounted);
        assert_eq!(
            storage.resolve(Path::new("Backups"), "a.db"),
            dir.path().join("Backups").join("a.db")
        );
    }

    #[test]
    fn missing_root_or_plain_file_is_unmounted() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            LocalStorage::new(dir.path().join("gone")).state(),
            StorageState::Unmounted
        );

        let file = dir.path().join("file");
        fs::write(&file, b"x").unwrap();
        assert_eq!(LocalStorage::new(&file).state(), StorageState::Unmounted);
    }

    #[test]
    fn read_only_directory_is_mounted_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("card");
        fs::create_dir(&root).unwrap();

        let mut perms = fs::metadata(&root).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&root, perms.clone()).unwrap();

        let state = LocalStorage::new(&root).state();

        perms.set_readonly(false);
        fs::set_permissions(&root, perms).unwrap();

        assert_eq!(state, StorageState::MountedReadOnly);
        assert!(state.is_readable());
        assert!(!StorageState::Unmounted.is_readable());
    }
}
