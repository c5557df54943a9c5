use std::sync::Arc;

use vakt_core::{ConsentProvider, RecordStore, StorageArea};
use vakt_routing::{
    ConsentAwareWriter, RoutingError, StoreMigratorResolver, StoreProcessorResolver,
    TracingErrorSink,
};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub consent: Arc<ConsentProvider>,
    pub writer: Arc<ConsentAwareWriter>,
    pub provisional: Arc<dyn RecordStore>,
    pub authorized: Arc<dyn RecordStore>,
}

impl AppState {
    /// Wire a writer to the provider and the two stores.
    pub fn new(
        consent: Arc<ConsentProvider>,
        provisional: Arc<dyn RecordStore>,
        authorized: Arc<dyn RecordStore>,
    ) -> Result<Self, RoutingError> {
        let writer = ConsentAwareWriter::new(
            &consent,
            Arc::new(StoreProcessorResolver::new(
                provisional.clone(),
                authorized.clone(),
            )),
            Arc::new(StoreMigratorResolver::new(
                provisional.clone(),
                authorized.clone(),
            )),
            Arc::new(TracingErrorSink),
        )?;

        Ok(Self {
            consent,
            writer: Arc::new(writer),
            provisional,
            authorized,
        })
    }

    pub fn store(&self, area: StorageArea) -> Arc<dyn RecordStore> {
        match area {
            StorageArea::Provisional => self.provisional.clone(),
            StorageArea::Authorized => self.authorized.clone(),
        }
    }
}
