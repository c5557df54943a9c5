use std::sync::Arc;

use vakt_core::{ConsentValue, Record, RecordStore, StorageError};

/// Persists or discards a single record.
pub trait DataProcessor: Send {
    fn process(&self, record: Record) -> Result<(), StorageError>;
}

/// Picks the processor for a consent value.
///
/// Called once when a writer starts and once per consent change, always on
/// the writer queue. Must be cheap and free of side effects.
pub trait ProcessorResolver: Send + Sync {
    fn resolve(&self, consent: ConsentValue) -> Box<dyn DataProcessor>;
}

/// The three processors, one per consent value.
pub enum StoreProcessor {
    /// Append to the provisional area (consent pending).
    Provisional(Arc<dyn RecordStore>),
    /// Append to the authorized area (consent granted).
    Authorized(Arc<dyn RecordStore>),
    /// Drop the record (consent not granted).
    Discard,
}

impl StoreProcessor {
    pub fn name(&self) -> &'static str {
        match self {
            StoreProcessor::Provisional(_) => "provisional",
            StoreProcessor::Authorized(_) => "authorized",
            StoreProcessor::Discard => "discard",
        }
    }
}

impl DataProcessor for StoreProcessor {
    fn process(&self, record: Record) -> Result<(), StorageError> {
        match self {
            StoreProcessor::Provisional(store) | StoreProcessor::Authorized(store) => {
                store.append(&record)?;
                Ok(())
            }
            StoreProcessor::Discard => {
                tracing::trace!("Discarding record {}", record.id);
                Ok(())
            }
        }
    }
}

/// Resolves processors writing to a provisional and an authorized store.
pub struct StoreProcessorResolver {
    provisional: Arc<dyn RecordStore>,
    authorized: Arc<dyn RecordStore>,
}

impl StoreProcessorResolver {
    pub fn new(provisional: Arc<dyn RecordStore>, authorized: Arc<dyn RecordStore>) -> Self {
        Self {
            provisional,
            authorized,
        }
    }

    /// The concrete processor for a consent value.
    pub fn processor_for(&self, consent: ConsentValue) -> StoreProcessor {
        match consent {
            ConsentValue::Pending => StoreProcessor::Provisional(self.provisional.clone()),
            ConsentValue::Granted => StoreProcessor::Authorized(self.authorized.clone()),
            ConsentValue::NotGranted => StoreProcessor::Discard,
        }
    }
}

impl ProcessorResolver for StoreProcessorResolver {
    fn resolve(&self, consent: ConsentValue) -> Box<dyn DataProcessor> {
        Box::new(self.processor_for(consent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vakt_core::{InMemoryRecordStore, StorageArea};

    fn stores() -> (Arc<InMemoryRecordStore>, Arc<InMemoryRecordStore>) {
        (
            Arc::new(InMemoryRecordStore::new(StorageArea::Provisional)),
            Arc::new(InMemoryRecordStore::new(StorageArea::Authorized)),
        )
    }

    #[test]
    fn test_each_consent_maps_to_its_processor() {
        let (provisional, authorized) = stores();
        let resolver = StoreProcessorResolver::new(provisional, authorized);

        assert_eq!(resolver.processor_for(ConsentValue::Pending).name(), "provisional");
        assert_eq!(resolver.processor_for(ConsentValue::Granted).name(), "authorized");
        assert_eq!(resolver.processor_for(ConsentValue::NotGranted).name(), "discard");
    }

    #[test]
    fn test_processors_write_to_matching_area() {
        let (provisional, authorized) = stores();
        let resolver = StoreProcessorResolver::new(provisional.clone(), authorized.clone());

        resolver
            .resolve(ConsentValue::Pending)
            .process(Record::new(serde_json::json!("p")))
            .unwrap();
        resolver
            .resolve(ConsentValue::Granted)
            .process(Record::new(serde_json::json!("g")))
            .unwrap();
        resolver
            .resolve(ConsentValue::NotGranted)
            .process(Record::new(serde_json::json!("n")))
            .unwrap();

        assert_eq!(provisional.payloads(), vec![serde_json::json!("p")]);
        assert_eq!(authorized.payloads(), vec![serde_json::json!("g")]);
    }
}
