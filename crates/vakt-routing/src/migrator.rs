use std::sync::Arc;

use vakt_core::{ConsentTransition, ConsentValue, RecordStore, StorageError};

/// Records read from the source store per round while moving.
const MOVE_BATCH: usize = 256;

/// What a migration did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub moved: usize,
    pub deleted: usize,
}

/// A one-shot data movement. `migrate` consumes the migrator.
///
/// Implementations must tolerate being re-run over a partially migrated
/// state: a failure halfway is reported, never retried by the writer.
pub trait DataMigrator: Send {
    fn name(&self) -> &'static str;

    fn migrate(self: Box<Self>) -> Result<MigrationReport, StorageError>;
}

/// Picks migrations for startup and for consent transitions.
pub trait MigratorResolver: Send + Sync {
    /// Reconcile data left by a previous run with the consent value at startup.
    fn resolve_initial(&self, startup: ConsentValue) -> Box<dyn DataMigrator>;

    /// Migration for an observed change, or `None` when swapping the
    /// processor is enough.
    fn resolve_for_transition(
        &self,
        transition: ConsentTransition,
    ) -> Option<Box<dyn DataMigrator>>;
}

pub enum StoreMigrator {
    /// Leave everything where it is.
    Retain,
    /// Move every record from one store to the other, oldest first.
    Move {
        from: Arc<dyn RecordStore>,
        to: Arc<dyn RecordStore>,
    },
    /// Irreversibly delete everything in a store.
    Purge(Arc<dyn RecordStore>),
}

impl DataMigrator for StoreMigrator {
    fn name(&self) -> &'static str {
        match self {
            StoreMigrator::Retain => "retain",
            StoreMigrator::Move { .. } => "move",
            StoreMigrator::Purge(_) => "purge",
        }
    }

    fn migrate(self: Box<Self>) -> Result<MigrationReport, StorageError> {
        match *self {
            StoreMigrator::Retain => Ok(MigrationReport::default()),
            StoreMigrator::Move { from, to } => {
                let mut report = MigrationReport::default();
                loop {
                    let batch = from.read_batch(MOVE_BATCH)?;
                    if batch.is_empty() {
                        break;
                    }
                    // One record at a time: a failure leaves each record in exactly one
                    // store, except possibly the one in flight.
                    for stored in batch {
                        to.append(&stored.record)?;
                        from.remove(&[stored.key])?;
                        report.moved += 1;
                    }
                }
                Ok(report)
            }
            StoreMigrator::Purge(store) => Ok(MigrationReport {
                moved: 0,
                deleted: store.purge()?,
            }),
        }
    }
}

/// Migration policy over a provisional and an authorized store.
pub struct StoreMigratorResolver {
    provisional: Arc<dyn RecordStore>,
    authorized: Arc<dyn RecordStore>,
}

impl StoreMigratorResolver {
    pub fn new(provisional: Arc<dyn RecordStore>, authorized: Arc<dyn RecordStore>) -> Self {
        Self {
            provisional,
            authorized,
        }
    }

    fn promote(&self) -> StoreMigrator {
        StoreMigrator::Move {
            from: self.provisional.clone(),
            to: self.authorized.clone(),
        }
    }

    /// Startup policy as a concrete migrator.
    pub fn initial_migrator(&self, startup: ConsentValue) -> StoreMigrator {
        match startup {
            ConsentValue::Pending => StoreMigrator::Retain,
            ConsentValue::Granted => self.promote(),
            ConsentValue::NotGranted => StoreMigrator::Purge(self.provisional.clone()),
        }
    }

    /// Transition policy as a concrete migrator.
    pub fn transition_migrator(&self, transition: ConsentTransition) -> Option<StoreMigrator> {
        use ConsentValue::*;

        match (transition.from, transition.to) {
            (Pending, Granted) => Some(self.promote()),
            (Pending, NotGranted) => Some(StoreMigrator::Purge(self.provisional.clone())),
            (Granted, NotGranted) => Some(StoreMigrator::Purge(self.authorized.clone())),
            // NotGranted never stored anything and Granted never downgrades to buffering.
            (NotGranted, Granted) | (NotGranted, Pending) | (Granted, Pending) => None,
            (Pending, Pending) | (Granted, Granted) | (NotGranted, NotGranted) => None,
        }
    }
}

impl MigratorResolver for StoreMigratorResolver {
    fn resolve_initial(&self, startup: ConsentValue) -> Box<dyn DataMigrator> {
        Box::new(self.initial_migrator(startup))
    }

    fn resolve_for_transition(
        &self,
        transition: ConsentTransition,
    ) -> Option<Box<dyn DataMigrator>> {
        self.transition_migrator(transition)
            .map(|m| Box::new(m) as Box<dyn DataMigrator>)
    }
}
