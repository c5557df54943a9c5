use crate::error::RoutingFailure;

/// Receives failures that happen on the writer queue.
pub trait ErrorSink: Send + Sync {
    fn report(&self, failure: RoutingFailure);
}

/// Error sink that logs through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, failure: RoutingFailure) {
        tracing::error!("{}", failure);
    }
}
