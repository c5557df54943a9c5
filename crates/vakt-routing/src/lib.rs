//! Vakt Routing - Consent-gated persistence.
//!
//! Decides where each written record lands (provisional area, authorized
//! area, or nowhere) and moves or purges stored data when consent changes.
//! All work for one writer runs on a single ordered queue.

pub mod diagnostics;
pub mod error;
pub mod migrator;
pub mod processor;
pub mod writer;

pub use diagnostics::{ErrorSink, TracingErrorSink};
pub use error::{RoutingError, RoutingFailure};
pub use migrator::{
    DataMigrator, MigrationReport, MigratorResolver, StoreMigrator, StoreMigratorResolver,
};
pub use processor::{DataProcessor, ProcessorResolver, StoreProcessor, StoreProcessorResolver};
pub use writer::ConsentAwareWriter;
