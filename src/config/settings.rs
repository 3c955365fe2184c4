use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::jobs::TaskId;

pub const DATABASE_NAME: &str = "customers.db";
pub const DATABASE_VERSION: i32 = 1;

pub const BACKUP_FOLDER: &str = "CustomerNotesBackup";
pub const BACKUP_FILENAME: &str = "customerNotesBackup.db";

pub const TASK_ID_BACKUP: TaskId = 200;
pub const TASK_ID_RESTORE: TaskId = 201;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Directory holding the live customers database.
    pub data_dir: PathBuf,
    /// Root of the storage that receives backups (the "external storage").
    pub storage_root: PathBuf,
    /// Backup folder, relative to `storage_root`.
    pub backup_folder: PathBuf,
    pub backup_filename: String,
    pub created_at: DateTime<Local>,
    pub last_updated: DateTime<Local>,
}

impl Settings {
    pub fn new(data_dir: impl Into<PathBuf>, storage_root: impl Into<PathBuf>) -> Self {
        let now = Local::now();
        Self {
            data_dir: data_dir.into(),
            storage_root: storage_root.into(),
            backup_folder: PathBuf::from(BACKUP_FOLDER),
            backup_filename: BACKUP_FILENAME.to_string(),
            created_at: now,
            last_updated: now,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_NAME)
    }

    /// Where a backup lands: `<storage_root>/<backup_folder>/<backup_filename>`.
    pub fn backup_path(&self) -> PathBuf {
        backup_location(&self.storage_root, &self.backup_folder, &self.backup_filename)
    }

    pub fn touch(&mut self) {
        self.last_updated = Local::now();
    }
}

pub fn backup_location(root: &Path, folder: &Path, filename: &str) -> PathBuf {
    root.join(folder).join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_standard_backup_file() {
        let settings = Settings::new("/var/lib/custnote", "/media/card");
        assert_eq!(settings.database_path(), PathBuf::from("/var/lib/custnote/customers.db"));
        assert_eq!(
            settings.backup_path(),
            PathBuf::from("/media/card/CustomerNotesBackup/customerNotesBackup.db")
        );
        assert_eq!(settings.created_at, settings.last_updated);
    }
}
