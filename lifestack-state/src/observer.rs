//! Observability sink contract.
//!
//! The sink is fire-and-forget: implementations must never block or fail
//! the calling operation. The state layer reports lifecycle events,
//! external-change signals, and errors through it; what happens downstream
//! (analytics, metrics, nothing at all) is the host application's business.

use crate::error::StateError;
use tracing::{debug, warn};

/// Fire-and-forget sink for state-layer observability signals.
pub trait ObservabilitySink: Send + Sync {
    /// Records a named event with string properties.
    fn track(&self, event: &str, properties: &[(&str, String)], user_id: Option<&str>);

    /// Records an error with the operation context it occurred in.
    fn track_error(&self, error: &StateError, context: &str);
}

/// Sink that forwards everything to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates a new tracing-backed sink.
    pub fn new() -> Self {
        Self
    }
}

impl ObservabilitySink for TracingSink {
    fn track(&self, event: &str, properties: &[(&str, String)], user_id: Option<&str>) {
        debug!(
            event,
            user = user_id.unwrap_or("-"),
            properties = ?properties,
            "observability event"
        );
    }

    fn track_error(&self, error: &StateError, context: &str) {
        warn!(context, error = %error, "observability error");
    }
}

/// Sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl NullSink {
    /// Creates a new discarding sink.
    pub fn new() -> Self {
        Self
    }
}

impl ObservabilitySink for NullSink {
    fn track(&self, _event: &str, _properties: &[(&str, String)], _user_id: Option<&str>) {}

    fn track_error(&self, _error: &StateError, _context: &str) {}
}

/// Test doubles for the observability contract.
pub mod mock {
    use super::ObservabilitySink;
    use crate::error::StateError;
    use std::sync::Mutex;

    /// One recorded `track` call.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedEvent {
        pub name: String,
        pub properties: Vec<(String, String)>,
        pub user_id: Option<String>,
    }

    /// A sink that records every call for assertion.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        events: Mutex<Vec<RecordedEvent>>,
        errors: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        /// Creates an empty recording sink.
        pub fn new() -> Self {
            Self::default()
        }

        /// All recorded events, in call order.
        pub fn events(&self) -> Vec<RecordedEvent> {
            self.events.lock().unwrap().clone()
        }

        /// The names of recorded events, in call order.
        pub fn event_names(&self) -> Vec<String> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| e.name.clone())
                .collect()
        }

        /// All recorded errors as `(context, message)` pairs.
        pub fn errors(&self) -> Vec<(String, String)> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl ObservabilitySink for RecordingSink {
        fn track(&self, event: &str, properties: &[(&str, String)], user_id: Option<&str>) {
            self.events.lock().unwrap().push(RecordedEvent {
                name: event.to_string(),
                properties: properties
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
                user_id: user_id.map(str::to_string),
            });
        }

        fn track_error(&self, error: &StateError, context: &str) {
            self.errors
                .lock()
                .unwrap()
                .push((context.to_string(), error.to_string()));
        }
    }
}
