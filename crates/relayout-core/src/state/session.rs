// Relayout Session State
// Buffers, modifier set and counters of the focused window context

use super::buffer::EventBuffer;
use super::modifiers::{ModifierSet, WORD_MARKER};
use crate::event::KeyEvent;
use crate::role::KeyRole;
use crate::Key;
use std::collections::HashSet;

/// What [`Session::admit`] did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Later repeat of a run already recorded
    Duplicate,
    /// Drop key: buffers were cleared
    Dropped,
    /// Ready to be buffered
    Accepted,
}

/// Mutable engine state for the active window context.
///
/// Owned exclusively by the engine; nothing here is shared across threads.
#[derive(Debug, Clone)]
pub struct Session {
    probe: EventBuffer,
    word: EventBuffer,
    sentence: EventBuffer,
    modifiers: ModifierSet,
    word_start: ModifierSet,
    sentence_start: ModifierSet,
    compose: usize,
    extra: usize,
    /// Codes whose current repeat run was already recorded
    repeating: HashSet<Key>,
    /// Keys pressed since the last drop; releases of other keys are orphans
    down: HashSet<Key>,
}

impl Session {
    /// New idle session whose probe keeps at most `seq_length` events
    pub fn new(seq_length: usize) -> Self {
        Self {
            probe: EventBuffer::bounded(seq_length),
            word: EventBuffer::new(),
            sentence: EventBuffer::new(),
            modifiers: ModifierSet::new(),
            word_start: ModifierSet::new(),
            sentence_start: ModifierSet::new(),
            compose: 0,
            extra: 0,
            repeating: HashSet::new(),
            down: HashSet::new(),
        }
    }

    /// Record an event: repeat dedup, modifier tracking, buffering by role.
    ///
    /// Returns false when the event was a duplicate repeat and ignored.
    pub fn record_key_event(&mut self, event: KeyEvent, role: KeyRole) -> bool {
        match self.admit(event, role) {
            Admission::Duplicate => false,
            Admission::Dropped => true,
            Admission::Accepted => {
                self.append(event, role);
                true
            }
        }
    }

    /// First half of [`Session::record_key_event`]: repeat dedup, Drop keys
    /// and modifier tracking. An `Accepted` event still has to be passed to
    /// [`Session::append`]; the engine checks layout and focus in between.
    pub fn admit(&mut self, event: KeyEvent, role: KeyRole) -> Admission {
        if !self.filter_repeat(event) {
            return Admission::Duplicate;
        }
        match role {
            KeyRole::Drop => {
                self.drop_all();
                Admission::Dropped
            }
            KeyRole::StateKey => {
                self.track_modifier(event);
                Admission::Accepted
            }
            KeyRole::Add | KeyRole::Test => Admission::Accepted,
        }
    }

    /// Repeat dedup: the first repeat of a run passes, later ones are
    /// filtered until a press or release of that code arrives.
    fn filter_repeat(&mut self, event: KeyEvent) -> bool {
        if event.transition.is_repeat() {
            self.repeating.insert(event.key)
        } else {
            self.repeating.remove(&event.key);
            true
        }
    }

    /// Update the modifier set from a state key event
    fn track_modifier(&mut self, event: KeyEvent) {
        self.modifiers.set(event.key.name(), event.transition.is_pressed());
    }

    /// Set a lock key from host state (the host is the truth for locks)
    pub fn set_lock(&mut self, key: Key, on: bool) {
        self.modifiers.set(key.name(), on);
    }

    /// Append to the buffers a role is authorized for. Releases of keys
    /// not pressed since the last drop are orphans and never buffered.
    pub fn append(&mut self, event: KeyEvent, role: KeyRole) {
        if event.transition.is_released() {
            if !self.down.remove(&event.key) {
                log::trace!("orphan release {}", event);
                return;
            }
        } else {
            self.down.insert(event.key);
        }

        match role {
            KeyRole::Add | KeyRole::StateKey => {
                self.probe.push(event);
                self.word.push(event);
                self.sentence.push(event);
            }
            KeyRole::Test => self.probe.push(event),
            KeyRole::Drop => {}
        }
    }

    /// Clear all buffers and snapshot the modifier set as the start of
    /// both the word and the sentence.
    pub fn drop_all(&mut self) {
        self.probe.clear();
        self.word.clear();
        self.sentence.clear();
        self.down.clear();
        self.modifiers.remove(WORD_MARKER);
        self.word_start = self.modifiers.clone();
        self.sentence_start = self.modifiers.clone();
        self.compose = 0;
    }

    /// Start a new word. A boundary key still held stays as the first
    /// event of the new word.
    pub fn start_new_word(&mut self) {
        match self.word.last() {
            Some(last) if last.transition.is_pressed() && !last.transition.is_repeat() => {
                self.word.retain_last()
            }
            _ => self.word.clear(),
        }
        self.modifiers.remove(WORD_MARKER);
        self.word_start = self.modifiers.clone();
        self.compose = 0;
    }

    pub fn start_new_sentence(&mut self) {
        self.drop_all();
    }

    pub fn increment_compose(&mut self) {
        self.compose += 1;
    }

    /// Mark that a retype just happened
    pub fn mark_retyped(&mut self) {
        self.modifiers.insert(WORD_MARKER);
    }

    pub fn set_extra(&mut self, extra: usize) {
        self.extra = extra;
    }

    pub fn extra(&self) -> usize {
        self.extra
    }

    pub fn compose(&self) -> usize {
        self.compose
    }

    pub fn modifiers(&self) -> &ModifierSet {
        &self.modifiers
    }

    pub fn word_start_modifiers(&self) -> &ModifierSet {
        &self.word_start
    }

    pub fn sentence_start_modifiers(&self) -> &ModifierSet {
        &self.sentence_start
    }

    pub fn probe(&self) -> &EventBuffer {
        &self.probe
    }

    pub fn word(&self) -> &EventBuffer {
        &self.word
    }

    pub fn word_mut(&mut self) -> &mut EventBuffer {
        &mut self.word
    }

    pub fn sentence(&self) -> &EventBuffer {
        &self.sentence
    }
}
