// Relayout Output Layer
// Synthetic key emission and tracking of keys held by synthetic presses

mod ledger;
mod recording;

#[cfg(feature = "pure-rust")]
mod uinput;

pub use ledger::KeyLedger;
pub use recording::RecordingSink;

#[cfg(feature = "pure-rust")]
pub use uinput::VirtualDevice;

use crate::{Key, Transition};

/// Error types for synthetic output
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

/// Destination for synthetic key events.
///
/// Implementations block for the configured settle delay after each event.
pub trait KeySink {
    /// Emit one transition followed by a sync report
    fn emit(&mut self, key: Key, transition: Transition) -> Result<(), OutputError>;

    fn press(&mut self, key: Key) -> Result<(), OutputError> {
        self.emit(key, Transition::Press)
    }

    fn release(&mut self, key: Key) -> Result<(), OutputError> {
        self.emit(key, Transition::Release)
    }

    /// Press and release
    fn tap(&mut self, key: Key) -> Result<(), OutputError> {
        self.press(key)?;
        self.release(key)
    }
}

impl<S: KeySink + ?Sized> KeySink for Box<S> {
    fn emit(&mut self, key: Key, transition: Transition) -> Result<(), OutputError> {
        (**self).emit(key, transition)
    }
}
