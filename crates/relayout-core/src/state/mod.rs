// Relayout Session State
// Event buffers, held modifiers and the per-context session

mod buffer;
mod modifiers;
mod session;

pub use buffer::EventBuffer;
pub use modifiers::{ModifierSet, WORD_MARKER};
pub use session::{Admission, Session};
