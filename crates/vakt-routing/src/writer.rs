use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use vakt_core::{
    ConsentProvider, ConsentSubscriber, ConsentTransition, ConsentValue, Record, StorageError,
};

use crate::diagnostics::ErrorSink;
use crate::error::{RoutingError, RoutingFailure};
use crate::migrator::{DataMigrator, MigratorResolver};
use crate::processor::{DataProcessor, ProcessorResolver};

type Encoder = Box<dyn FnOnce() -> Result<Record, StorageError> + Send>;
type Job = Box<dyn FnOnce() + Send>;

enum Task {
    Write(Encoder),
    ConsentChanged(ConsentTransition),
    Exclusive(Job),
}

impl Task {
    fn name(&self) -> &'static str {
        match self {
            Task::Write(_) => "write",
            Task::ConsentChanged(_) => "consent change",
            Task::Exclusive(_) => "exclusive",
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Routes written values to the storage area allowed by the current consent.
///
/// Writes, consent transitions and migrations all run on one dedicated worker
/// thread in submission order. That order is the only synchronization around
/// the current processor: a write enqueued before a consent change is handled
/// by the old processor, a write enqueued after it by the new one.
///
/// A task that fails or panics is reported to the error sink and the worker
/// moves on to the next one.
pub struct ConsentAwareWriter {
    queue: mpsc::UnboundedSender<Task>,
    sink: Arc<dyn ErrorSink>,
}

impl ConsentAwareWriter {
    /// Start a writer bound to `provider`.
    ///
    /// The processor for the current consent is installed before this returns.
    /// The startup migration runs asynchronously, ahead of every queued task.
    pub fn new(
        provider: &ConsentProvider,
        processors: Arc<dyn ProcessorResolver>,
        migrators: Arc<dyn MigratorResolver>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, RoutingError> {
        let (queue, receiver) = mpsc::unbounded_channel();

        let subscription = Arc::new(QueueSubscription {
            queue: queue.downgrade(),
        });
        let startup = provider.subscribe(subscription);

        let worker = Worker {
            receiver,
            consent: startup,
            processor: processors.resolve(startup),
            processors,
            migrators,
            sink: sink.clone(),
        };
        let initial = worker.migrators.resolve_initial(startup);

        thread::Builder::new()
            .name("vakt-writer".to_string())
            .spawn(move || worker.run(initial))?;

        tracing::info!("Writer started with {} consent", startup);

        Ok(Self { queue, sink })
    }

    /// Queue a value for persistence. Returns immediately; failures go to the sink.
    pub fn write<T>(&self, value: T)
    where
        T: Serialize + Send + 'static,
    {
        let encode: Encoder = Box::new(move || Record::encode(&value));
        self.enqueue(Task::Write(encode));
    }

    /// Run `f` on the writer queue, after everything queued before it.
    ///
    /// Returns `None` if the worker is gone.
    pub async fn run_exclusive<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            let _ = tx.send(f());
        });

        if !self.enqueue(Task::Exclusive(job)) {
            return None;
        }
        rx.await.ok()
    }

    /// Wait until every task queued so far has run.
    pub async fn flush(&self) {
        self.run_exclusive(|| ()).await;
    }

    fn enqueue(&self, task: Task) -> bool {
        match self.queue.send(task) {
            Ok(()) => true,
            Err(mpsc::error::SendError(task)) => {
                self.sink.report(RoutingFailure::QueueClosed { task: task.name() });
                false
            }
        }
    }
}

/// Registered with the consent provider. Holds a weak sender so the
/// provider does not keep a dropped writer's queue open.
struct QueueSubscription {
    queue: mpsc::WeakUnboundedSender<Task>,
}

impl ConsentSubscriber for QueueSubscription {
    fn consent_changed(&self, transition: ConsentTransition) -> bool {
        match self.queue.upgrade() {
            Some(queue) => queue.send(Task::ConsentChanged(transition)).is_ok(),
            None => false,
        }
    }
}

struct Worker {
    receiver: mpsc::UnboundedReceiver<Task>,
    consent: ConsentValue,
    processor: Box<dyn DataProcessor>,
    processors: Arc<dyn ProcessorResolver>,
    migrators: Arc<dyn MigratorResolver>,
    sink: Arc<dyn ErrorSink>,
}

impl Worker {
    fn run(mut self, initial: Box<dyn DataMigrator>) {
        self.guarded("initial migration", |worker| worker.migrate(initial));

        while let Some(task) = self.receiver.blocking_recv() {
            self.guarded(task.name(), |worker| match task {
                Task::Write(encode) => worker.write(encode),
                Task::ConsentChanged(transition) => worker.consent_changed(transition),
                Task::Exclusive(job) => job(),
            });
        }

        tracing::debug!("Writer queue closed, worker exiting");
    }

    /// Run one task, turning a panic into a reported failure.
    fn guarded(&mut self, task: &'static str, f: impl FnOnce(&mut Self)) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| f(self))) {
            self.sink.report(RoutingFailure::Panicked {
                task,
                message: panic_message(payload.as_ref()),
            });
        }
    }

    fn write(&self, encode: Encoder) {
        let result = encode().and_then(|record| self.processor.process(record));
        if let Err(source) = result {
            self.sink.report(RoutingFailure::Write {
                consent: self.consent,
                source,
            });
        }
    }

    /// Swap the processor and run the transition migration as one queued unit.
    fn consent_changed(&mut self, transition: ConsentTransition) {
        if transition.is_noop() {
            tracing::debug!("Ignoring consent self-transition {}", transition);
            return;
        }

        tracing::info!("Consent changed: {}", transition);
        self.processor = self.processors.resolve(transition.to);
        self.consent = transition.to;

        if let Some(migrator) = self.migrators.resolve_for_transition(transition) {
            self.migrate(migrator);
        }
    }

    fn migrate(&self, migrator: Box<dyn DataMigrator>) {
        let name = migrator.name();
        match migrator.migrate() {
            Ok(report) => tracing::info!(
                "Migration {} finished: moved {}, deleted {}",
                name,
                report.moved,
                report.deleted
            ),
            Err(source) => self.sink.report(RoutingFailure::Migration {
                migrator: name,
                source,
            }),
        }
    }
}
