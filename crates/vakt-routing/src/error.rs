use thiserror::Error;

use vakt_core::{ConsentValue, StorageError};

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Failed to start writer queue: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A failure on the writer queue. These never reach `write` callers;
/// they are handed to an [`ErrorSink`](crate::ErrorSink).
#[derive(Error, Debug)]
pub enum RoutingFailure {
    #[error("Failed to persist record under {consent} consent: {source}")]
    Write {
        consent: ConsentValue,
        source: StorageError,
    },

    #[error("Migration {migrator} failed: {source}")]
    Migration {
        migrator: &'static str,
        source: StorageError,
    },

    #[error("Writer task {task} panicked: {message}")]
    Panicked { task: &'static str, message: String },

    #[error("Writer queue is closed, dropped {task} task")]
    QueueClosed { task: &'static str },
}
