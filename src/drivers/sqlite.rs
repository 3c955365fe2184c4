use std::path::Path;

use rusqlite::{Connection, OpenFlags};

use super::DbTransfer;
use crate::error::TransferError;
use crate::utils::io;

/// Whole-file transfer of SQLite databases with a `user_version` probe.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteFileTransfer;

impl DbTransfer for SqliteFileTransfer {
    fn name(&self) -> &'static str { "sqlite-file" }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64, TransferError> {
        io::copy_file(from, to).map_err(|source| TransferError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }

    fn read_version(&self, database: &Path) -> Result<i32, TransferError> {
        let to_err = |source: rusqlite::Error| TransferError::Version {
            path: database.to_path_buf(),
            source,
        };
        let conn = Connection::open_with_flags(
            database,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(to_err)?;
        let version = conn
            .pragma_query_value(None, "user_version", |row| row.get::<_, i32>(0))
            .map_err(to_err)?;
        conn.close().map_err(|(_, e)| to_err(e))?;
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database_with_version(path: &Path, version: i32) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);").unwrap();
        conn.pragma_update(None, "user_version", version).unwrap();
    }

    #[test]
    fn reads_user_version_without_touching_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("a.db");
        database_with_version(&db, 3);
        let before = std::fs::read(&db).unwrap();

        assert_eq!(SqliteFileTransfer.read_version(&db).unwrap(), 3);
        assert_eq!(std::fs::read(&db).unwrap(), before);
    }

    #[test]
    fn missing_or_foreign_files_fail_the_probe() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        assert!(matches!(
            SqliteFileTransfer.read_version(&missing),
            Err(TransferError::Version { .. })
        ));
        assert!(!missing.exists());

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"this is not a sqlite database at all").unwrap();
        assert!(SqliteFileTransfer.read_version(&text).is_err());
    }

    #[test]
    fn versions_match_compares_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.db");
        let b = dir.path().join("b.db");
        let c = dir.path().join("c.db");
        database_with_version(&a, 1);
        database_with_version(&b, 1);
        database_with_version(&c, 5);

        assert!(SqliteFileTransfer.versions_match(&a, &b).unwrap());
        assert!(!SqliteFileTransfer.versions_match(&a, &c).unwrap());
    }

    #[test]
    fn copy_error_names_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqliteFileTransfer
            .copy(&dir.path().join("nope.db"), &dir.path().join("out.db"))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("nope.db"));
        assert!(msg.contains("out.db"));
    }
}
