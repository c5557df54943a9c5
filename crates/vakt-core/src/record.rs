use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;

/// A single unit of data an application asked to record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl Record {
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            payload,
        }
    }

    /// Build a record from any serializable value.
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, StorageError> {
        let payload =
            serde_json::to_value(value).map_err(|e| StorageError::Encoding(e.to_string()))?;
        Ok(Self::new(payload))
    }
}

/// A record together with the key its store assigned on append.
///
/// Keys grow monotonically within a store, so ordering by key is append order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub key: u64,
    pub record: Record,
}

impl StoredRecord {
    pub fn new(key: u64, record: Record) -> Self {
        Self { key, record }
    }
}
