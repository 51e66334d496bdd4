// Relayout Recording Sink
// In-memory KeySink used by dry runs and tests

use super::{KeySink, OutputError};
use crate::event::KeyEvent;
use crate::{Key, Transition};
use parking_lot::Mutex;
use std::sync::Arc;

/// Records every emitted event instead of writing to a device.
///
/// Clones share the same log, so a caller can keep a handle after giving
/// the sink to the engine.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<KeyEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<KeyEvent> {
        self.events.lock().clone()
    }

    /// Take and clear the log
    pub fn take(&self) -> Vec<KeyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Events rendered as a `NAME:code` tail, like the rule grammar sees them
    pub fn tail(&self) -> String {
        self.events
            .lock()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl KeySink for RecordingSink {
    fn emit(&mut self, key: Key, transition: Transition) -> Result<(), OutputError> {
        let event = KeyEvent::new(key, transition);
        log::trace!("emit {}", event);
        self.events.lock().push(event);
        Ok(())
    }
}
