//! Database layer for ClipDrop items.

/// Item storage operations.
pub mod item;
/// Table definitions.
pub mod tables;

use crate::constants::REDB_FILE_NAME;
use crate::error::AppError;
use std::path::Path;
use std::sync::Arc;

/// Database handle with access to item storage.
pub struct Database {
    pub db: Arc<redb::Database>,
    pub items: item::ItemDb,
}

#[cfg(test)]
mod tests;

impl Database {
    /// Build a database handle from an existing shared redb instance.
    ///
    /// # Errors
    /// Returns an error if the item tables cannot be initialized.
    pub fn from_shared(db: Arc<redb::Database>) -> Result<Self, AppError> {
        Ok(Self {
            items: item::ItemDb::new(db.clone())?,
            db,
        })
    }

    /// Clone this handle for another worker in the same process.
    ///
    /// redb allows one open handle per file, so workers share the instance
    /// instead of reopening the path.
    ///
    /// # Errors
    /// Returns an error if table initialization fails.
    pub fn share(&self) -> Result<Self, AppError> {
        Self::from_shared(self.db.clone())
    }

    /// Open (or create) the database under directory `path`.
    ///
    /// # Returns
    /// A fully initialized [`Database`].
    ///
    /// # Errors
    /// Returns [`AppError::StorageUnavailable`] when the directory cannot be
    /// created, the file is held by another process, or redb fails to open it.
    pub fn new(path: &str) -> Result<Self, AppError> {
        let dir = Path::new(path);
        std::fs::create_dir_all(dir).map_err(|err| {
            AppError::StorageUnavailable(format!(
                "Failed to create database directory '{}': {}",
                dir.display(),
                err
            ))
        })?;

        let file = dir.join(REDB_FILE_NAME);
        let db = match redb::Database::create(&file) {
            Ok(db) => Arc::new(db),
            Err(redb::DatabaseError::DatabaseAlreadyOpen) => {
                return Err(AppError::StorageUnavailable(format!(
                    "Database '{}' is already open in another process.\n\
                    Stop the other ClipDrop instance, or set DB_PATH to a different location.",
                    file.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %file.display(), "Opened item database");

        Self::from_shared(db)
    }
}
