use std::sync::Arc;

use redb::{Database, ReadableTable, ReadableTableMetadata};

use vakt_core::{Record, RecordStore, StorageArea, StorageError, StoredRecord};

use crate::tables::{records_table, AUTHORIZED_TABLE, PROVISIONAL_TABLE, SEQUENCES_TABLE};

fn db_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Database(e.to_string())
}

/// redb implementation of RecordStore. One instance per area, sharing a database.
pub struct RedbRecordStore {
    db: Arc<Database>,
    area: StorageArea,
}

impl RedbRecordStore {
    pub fn new(db: Arc<Database>, area: StorageArea) -> Self {
        Self { db, area }
    }

    /// Initialize the database tables.
    pub fn init_tables(db: &Database) -> Result<(), StorageError> {
        let write_txn = db.begin_write().map_err(db_error)?;
        {
            // Create tables if they don't exist
            let _ = write_txn.open_table(PROVISIONAL_TABLE).map_err(db_error)?;
            let _ = write_txn.open_table(AUTHORIZED_TABLE).map_err(db_error)?;
            let _ = write_txn.open_table(SEQUENCES_TABLE).map_err(db_error)?;
        }
        write_txn.commit().map_err(db_error)?;
        Ok(())
    }
}

impl RecordStore for RedbRecordStore {
    fn area(&self) -> StorageArea {
        self.area
    }

    fn append(&self, record: &Record) -> Result<u64, StorageError> {
        let value =
            serde_json::to_vec(record).map_err(|e| StorageError::Encoding(e.to_string()))?;

        let write_txn = self.db.begin_write().map_err(db_error)?;

        let key = {
            // Keys come from a per-area counter so they are never reused after a purge
            let mut seq_table = write_txn.open_table(SEQUENCES_TABLE).map_err(db_error)?;
            let key = seq_table
                .get(self.area.as_str())
                .map_err(db_error)?
                .map(|v| v.value())
                .unwrap_or(0)
                + 1;
            seq_table.insert(self.area.as_str(), key).map_err(db_error)?;

            let mut table = write_txn
                .open_table(records_table(self.area))
                .map_err(db_error)?;
            table.insert(key, value.as_slice()).map_err(db_error)?;

            key
        };

        write_txn.commit().map_err(db_error)?;

        Ok(key)
    }

    fn read_batch(&self, limit: usize) -> Result<Vec<StoredRecord>, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_error)?;
        let table = read_txn
            .open_table(records_table(self.area))
            .map_err(db_error)?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(db_error)?.take(limit) {
            let (key, value) = entry.map_err(db_error)?;
            let key = key.value();
            let record: Record = serde_json::from_slice(value.value())
                .map_err(|e| StorageError::Decoding(key, e.to_string()))?;
            records.push(StoredRecord::new(key, record));
        }

        Ok(records)
    }

    fn count(&self) -> Result<usize, StorageError> {
        let read_txn = self.db.begin_read().map_err(db_error)?;
        let table = read_txn
            .open_table(records_table(self.area))
            .map_err(db_error)?;

        Ok(table.len().map_err(db_error)? as usize)
    }

    fn remove(&self, keys: &[u64]) -> Result<usize, StorageError> {
        let write_txn = self.db.begin_write().map_err(db_error)?;

        let mut removed = 0;
        {
            let mut table = write_txn
                .open_table(records_table(self.area))
                .map_err(db_error)?;
            for key in keys {
                if table.remove(*key).map_err(db_error)?.is_some() {
                    removed += 1;
                }
            }
        }

        write_txn.commit().map_err(db_error)?;

        Ok(removed)
    }

    fn purge(&self) -> Result<usize, StorageError> {
        let write_txn = self.db.begin_write().map_err(db_error)?;

        let deleted = {
            let mut table = write_txn
                .open_table(records_table(self.area))
                .map_err(db_error)?;

            let keys = table
                .iter()
                .map_err(db_error)?
                .map(|entry| entry.map(|(key, _)| key.value()))
                .collect::<Result<Vec<u64>, _>>()
                .map_err(db_error)?;

            for key in &keys {
                table.remove(*key).map_err(db_error)?;
            }

            keys.len()
        };

        write_txn.commit().map_err(db_error)?;

        Ok(deleted)
    }
}
