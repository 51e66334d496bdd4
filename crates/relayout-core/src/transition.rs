use std::fmt;

/// State change reported for a key.
///
/// From `evtest` output, the "magic numbers" for assignment to enums:
///   0 == 'released'
///   1 == 'pressed'
///   2 == 'repeated'
///
/// The numeric value is also the transition code used in rule sequences
/// (`A:1`, `SPACE:0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Transition {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Transition {
    /// Returns true if the key is held down after this transition
    pub fn is_pressed(self) -> bool {
        matches!(self, Transition::Press | Transition::Repeat)
    }

    pub fn is_released(self) -> bool {
        matches!(self, Transition::Release)
    }

    pub fn is_repeat(self) -> bool {
        matches!(self, Transition::Repeat)
    }

    /// Create Transition from the evdev event value
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Transition::Release),
            1 => Some(Transition::Press),
            2 => Some(Transition::Repeat),
            _ => None,
        }
    }

    /// Transition code as written in rule sequences
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Release => write!(f, "release"),
            Transition::Press => write!(f, "press"),
            Transition::Repeat => write!(f, "repeat"),
        }
    }
}
