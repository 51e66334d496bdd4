// Relayout Key Ledger
// Keys currently held by synthetic presses, released in press order

use crate::Key;
use indexmap::IndexSet;

/// Tracks keys pressed through the output sink so a retype never leaves
/// anything held down.
#[derive(Debug, Clone, Default)]
pub struct KeyLedger {
    pressed: IndexSet<Key>,
}

impl KeyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press
    pub fn add(&mut self, key: Key) {
        self.pressed.insert(key);
    }

    /// Record a release. Returns false when the key was not held.
    pub fn remove(&mut self, key: Key) -> bool {
        self.pressed.shift_remove(&key)
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Remove and return every held key, oldest press first
    pub fn drain(&mut self) -> Vec<Key> {
        self.pressed.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}
