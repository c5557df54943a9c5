//! Vakt DB - redb implementation of the record store.

pub mod record_store;
pub mod tables;

pub use record_store::RedbRecordStore;

use std::path::Path;
use std::sync::Arc;

use redb::Database;

use vakt_core::StorageError;

/// Open (or create) a database with all required tables.
pub fn init_database(path: impl AsRef<Path>) -> Result<Arc<Database>, StorageError> {
    let db = Database::create(path).map_err(|e| StorageError::Database(e.to_string()))?;

    RedbRecordStore::init_tables(&db)?;

    Ok(Arc::new(db))
}
