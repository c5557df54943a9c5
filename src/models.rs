use serde::{Deserialize, Serialize};

use vakt_core::{ConsentValue, StorageArea, StoredRecord};

/// Request to change the consent value.
#[derive(Debug, Deserialize)]
pub struct ChangeConsentRequest {
    pub consent: ConsentValue,
}

/// Response for the current consent value.
#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub consent: ConsentValue,
}

/// Response for a consent change.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub from: ConsentValue,
    pub to: ConsentValue,
}

/// Response listing the records of one area.
#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub area: StorageArea,
    pub count: usize,
    pub records: Vec<StoredRecord>,
}

/// Query parameters for the batch endpoint.
#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Largest batch handed out at once.
pub const MAX_BATCH: usize = 1000;

/// Response for the batch endpoint.
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub records: Vec<StoredRecord>,
}

/// Keys of records the uploader has transmitted.
#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub keys: Vec<u64>,
}

/// Response for an acknowledgement.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub removed: usize,
}
