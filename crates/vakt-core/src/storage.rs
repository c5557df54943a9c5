use serde::{Deserialize, Serialize};

use crate::error::{StorageError, ValidationError};
use crate::record::{Record, StoredRecord};

/// The two places a record may land in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageArea {
    /// Records written while consent is pending.
    Provisional,
    /// Records written with consent granted, waiting for upload.
    Authorized,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Provisional => "provisional",
            StorageArea::Authorized => "authorized",
        }
    }
}

impl std::fmt::Display for StorageArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageArea {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "provisional" | "pending" => Ok(StorageArea::Provisional),
            "authorized" | "granted" => Ok(StorageArea::Authorized),
            _ => Err(ValidationError::UnknownArea(s.to_string())),
        }
    }
}

/// Trait for an append-only record area.
///
/// Records are returned oldest first. A record leaves the store only through
/// `remove` (acknowledged by the upload path, or moved by a migration) or `purge`.
pub trait RecordStore: Send + Sync {
    /// The area this store backs.
    fn area(&self) -> StorageArea;

    /// Append a record and return the key assigned to it.
    fn append(&self, record: &Record) -> Result<u64, StorageError>;

    /// Read up to `limit` of the oldest records.
    fn read_batch(&self, limit: usize) -> Result<Vec<StoredRecord>, StorageError>;

    /// Read every record in append order.
    fn read_all(&self) -> Result<Vec<StoredRecord>, StorageError> {
        self.read_batch(usize::MAX)
    }

    /// Number of records currently held.
    fn count(&self) -> Result<usize, StorageError>;

    /// Remove the given keys. Keys that are already gone are ignored.
    /// Returns how many records were actually removed.
    fn remove(&self, keys: &[u64]) -> Result<usize, StorageError>;

    /// Irreversibly delete every record. Returns how many were deleted.
    fn purge(&self) -> Result<usize, StorageError>;
}

// In-memory implementation for testing
#[cfg(any(test, feature = "test-utils"))]
pub mod memory {
    use super::*;
    use parking_lot::RwLock;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Inner {
        last_key: u64,
        records: BTreeMap<u64, Record>,
    }

    /// In-memory record store for testing.
    pub struct InMemoryRecordStore {
        area: StorageArea,
        inner: RwLock<Inner>,
    }

    impl InMemoryRecordStore {
        pub fn new(area: StorageArea) -> Self {
            Self {
                area,
                inner: RwLock::new(Inner::default()),
            }
        }

        /// Payloads in append order, handy for assertions.
        pub fn payloads(&self) -> Vec<serde_json::Value> {
            self.inner
                .read()
                .records
                .values()
                .map(|r| r.payload.clone())
                .collect()
        }
    }

    impl RecordStore for InMemoryRecordStore {
        fn area(&self) -> StorageArea {
            self.area
        }

        fn append(&self, record: &Record) -> Result<u64, StorageError> {
            let mut inner = self.inner.write();
            inner.last_key += 1;
            let key = inner.last_key;
            inner.records.insert(key, record.clone());
            Ok(key)
        }

        fn read_batch(&self, limit: usize) -> Result<Vec<StoredRecord>, StorageError> {
            Ok(self
                .inner
                .read()
                .records
                .iter()
                .take(limit)
                .map(|(key, record)| StoredRecord::new(*key, record.clone()))
                .collect())
        }

        fn count(&self) -> Result<usize, StorageError> {
            Ok(self.inner.read().records.len())
        }

        fn remove(&self, keys: &[u64]) -> Result<usize, StorageError> {
            let mut inner = self.inner.write();
            Ok(keys
                .iter()
                .filter(|key| inner.records.remove(*key).is_some())
                .count())
        }

        fn purge(&self) -> Result<usize, StorageError> {
            let mut inner = self.inner.write();
            let deleted = inner.records.len();
            inner.records.clear();
            Ok(deleted)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn record(n: i64) -> Record {
            Record::new(serde_json::json!(n))
        }

        #[test]
        fn test_append_assigns_increasing_keys() {
            let store = InMemoryRecordStore::new(StorageArea::Provisional);

            let k1 = store.append(&record(1)).unwrap();
            let k2 = store.append(&record(2)).unwrap();

            assert!(k1 < k2);
            assert_eq!(store.count().unwrap(), 2);
        }

        #[test]
        fn test_read_batch_is_oldest_first() {
            let store = InMemoryRecordStore::new(StorageArea::Authorized);
            for n in 1..=5 {
                store.append(&record(n)).unwrap();
            }

            let batch = store.read_batch(3).unwrap();
            let payloads: Vec<_> = batch.iter().map(|s| s.record.payload.clone()).collect();
            assert_eq!(
                payloads,
                vec![serde_json::json!(1), serde_json::json!(2), serde_json::json!(3)]
            );
        }

        #[test]
        fn test_remove_ignores_missing_keys() {
            let store = InMemoryRecordStore::new(StorageArea::Authorized);
            let key = store.append(&record(1)).unwrap();

            assert_eq!(store.remove(&[key, key + 100]).unwrap(), 1);
            assert_eq!(store.remove(&[key]).unwrap(), 0);
            assert_eq!(store.count().unwrap(), 0);
        }

        #[test]
        fn test_keys_are_not_reused_after_purge() {
            let store = InMemoryRecordStore::new(StorageArea::Provisional);
            let first = store.append(&record(1)).unwrap();

            assert_eq!(store.purge().unwrap(), 1);
            let second = store.append(&record(2)).unwrap();

            assert!(second > first);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_parse_accepts_consent_aliases() {
        assert_eq!("pending".parse::<StorageArea>(), Ok(StorageArea::Provisional));
        assert_eq!("authorized".parse::<StorageArea>(), Ok(StorageArea::Authorized));
        assert_eq!("granted".parse::<StorageArea>(), Ok(StorageArea::Authorized));
        assert_eq!(" Authorized ".parse::<StorageArea>(), Ok(StorageArea::Authorized));
        assert_eq!("PENDING".parse::<StorageArea>(), Ok(StorageArea::Provisional));
        assert_eq!(
            "trash".parse::<StorageArea>(),
            Err(ValidationError::UnknownArea("trash".to_string()))
        );
    }
}
