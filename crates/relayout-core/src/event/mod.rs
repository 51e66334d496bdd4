// Relayout Event Handling
// Normalized input events and the per-device reader threads that produce them

#[cfg(feature = "pure-rust")]
pub mod reader;

use crate::{Key, Transition};
use std::fmt;

#[cfg(feature = "pure-rust")]
pub use reader::{list_devices, spawn_readers, DeviceInfo, ReaderError, ReaderResult, QUEUE_CAPACITY};

/// A single key transition reported by a keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub transition: Transition,
}

impl KeyEvent {
    pub fn new(key: Key, transition: Transition) -> Self {
        Self { key, transition }
    }

    pub fn press(key: Key) -> Self {
        Self::new(key, Transition::Press)
    }

    pub fn release(key: Key) -> Self {
        Self::new(key, Transition::Release)
    }

    pub fn repeat(key: Key) -> Self {
        Self::new(key, Transition::Repeat)
    }

    /// Build from raw evdev code/value; `None` for values outside 0..=2
    pub fn from_raw(code: u16, value: i32) -> Option<Self> {
        Transition::from_i32(value).map(|transition| Self::new(Key(code), transition))
    }
}

/// Renders the `NAME:code` token matched by `SEQ:` conditions
impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.key.name(), self.transition.code())
    }
}

/// Everything the device layer pushes to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// A mouse button went down; may invalidate the cursor position
    MouseClick,
}

impl From<KeyEvent> for InputEvent {
    fn from(event: KeyEvent) -> Self {
        InputEvent::Key(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_rendering() {
        assert_eq!(KeyEvent::press(Key(30)).to_string(), "A:1");
        assert_eq!(KeyEvent::release(Key::SPACE).to_string(), "SPACE:0");
        assert_eq!(KeyEvent::repeat(Key(2)).to_string(), "1:2");
    }

    #[test]
    fn test_from_raw() {
        assert_eq!(
            KeyEvent::from_raw(30, 1),
            Some(KeyEvent::press(Key(30)))
        );
        assert_eq!(KeyEvent::from_raw(30, 7), None);
    }
}
