use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The user's tracking consent decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentValue {
    /// No decision yet. Data is buffered provisionally.
    Pending,
    /// Data may be stored for upload.
    Granted,
    /// Data must never be stored.
    NotGranted,
}

impl ConsentValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentValue::Pending => "pending",
            ConsentValue::Granted => "granted",
            ConsentValue::NotGranted => "not_granted",
        }
    }
}

impl std::fmt::Display for ConsentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsentValue {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ConsentValue::Pending),
            "granted" => Ok(ConsentValue::Granted),
            "not_granted" | "not-granted" | "notgranted" => Ok(ConsentValue::NotGranted),
            _ => Err(ValidationError::UnknownConsent(s.to_string())),
        }
    }
}

/// A single observed consent change, `from` the previous value `to` the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsentTransition {
    pub from: ConsentValue,
    pub to: ConsentValue,
}

impl ConsentTransition {
    pub fn new(from: ConsentValue, to: ConsentValue) -> Self {
        Self { from, to }
    }

    /// True when the value did not actually change.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

impl std::fmt::Display for ConsentTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Receives consent change notifications from a [`ConsentProvider`].
///
/// Implementations are called while the provider serializes changes, so
/// they must return quickly (typically by enqueueing work elsewhere).
pub trait ConsentSubscriber: Send + Sync {
    /// Handle a change. Returning `false` unregisters the subscriber.
    fn consent_changed(&self, transition: ConsentTransition) -> bool;
}

struct ProviderState {
    current: ConsentValue,
    subscribers: Vec<Arc<dyn ConsentSubscriber>>,
}

/// Owns the process-wide consent value and notifies subscribers on change.
pub struct ConsentProvider {
    state: Mutex<ProviderState>,
}

impl ConsentProvider {
    pub fn new(initial: ConsentValue) -> Self {
        Self {
            state: Mutex::new(ProviderState {
                current: initial,
                subscribers: Vec::new(),
            }),
        }
    }

    pub fn current_value(&self) -> ConsentValue {
        self.state.lock().current
    }

    /// Register a subscriber and return the value it starts from.
    ///
    /// Reading the value and registering happen under one lock, so every
    /// change after the returned value is delivered to the subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn ConsentSubscriber>) -> ConsentValue {
        let mut state = self.state.lock();
        state.subscribers.push(subscriber);
        state.current
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Set a new consent value and notify all subscribers in registration order.
    ///
    /// Subscribers are notified even when the value is unchanged; they decide
    /// what a self-transition means for them. Subscribers that report
    /// themselves gone are dropped from the list.
    pub fn change_to(&self, value: ConsentValue) -> ConsentTransition {
        let mut state = self.state.lock();
        let transition = ConsentTransition::new(state.current, value);
        state.current = value;

        // Notifying under the lock keeps delivery order equal to change order.
        state
            .subscribers
            .retain(|subscriber| subscriber.consent_changed(transition));

        transition
    }
}
