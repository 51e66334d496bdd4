// Relayout Event Buffers
// Ordered key event history used for the Probe, Word and Sentence buffers

use crate::event::KeyEvent;
use std::collections::VecDeque;

/// Append-only (until cleared) sequence of key events.
///
/// A bounded buffer forgets its oldest events once full; rules only ever
/// look at the newest `SeqLength` probe events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBuffer {
    events: VecDeque<KeyEvent>,
    capacity: Option<usize>,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn push(&mut self, event: KeyEvent) {
        if let Some(cap) = self.capacity {
            while self.events.len() >= cap {
                self.events.pop_front();
            }
        }
        self.events.push_back(event);
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&KeyEvent> {
        self.events.back()
    }

    pub fn get(&self, idx: usize) -> Option<&KeyEvent> {
        self.events.get(idx)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &KeyEvent> + ExactSizeIterator {
        self.events.iter()
    }

    /// Keep only the first `len` events
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Keep only the last event
    pub fn retain_last(&mut self) {
        let keep = self.events.len().saturating_sub(1);
        self.events.drain(..keep);
    }

    /// Comma-joined `NAME:code` tokens of the newest `n` events
    pub fn tail(&self, n: usize) -> String {
        let skip = self.events.len().saturating_sub(n);
        let mut out = String::new();
        for (i, event) in self.events.iter().skip(skip).enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&event.to_string());
        }
        out
    }

    pub fn to_vec(&self) -> Vec<KeyEvent> {
        self.events.iter().copied().collect()
    }
}
