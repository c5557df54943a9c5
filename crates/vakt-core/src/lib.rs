//! Vakt Core - Consent state, records and storage seams.
//!
//! This crate contains the domain types shared by the router and the
//! storage backends. It has no dependencies on other Vakt crates.

pub mod consent;
pub mod error;
pub mod record;
pub mod storage;

// Re-exports for convenience
pub use consent::{ConsentProvider, ConsentSubscriber, ConsentTransition, ConsentValue};
pub use error::{StorageError, ValidationError};
pub use record::{Record, StoredRecord};
pub use storage::{RecordStore, StorageArea};

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::InMemoryRecordStore;
