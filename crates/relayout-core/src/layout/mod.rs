// Relayout Layout Control
// Current keyboard layout group, layout selection and lock-key state

mod command;
mod memory;

#[cfg(feature = "x11-backend")]
mod x11;

pub use command::CommandLayout;
pub use memory::MemoryLayout;

#[cfg(feature = "x11-backend")]
pub use x11::XkbLayout;

/// Error types for layout operations
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Layout backend unavailable: {0}")]
    Unavailable(String),

    #[error("Layout query failed: {0}")]
    QueryFailed(String),

    #[error("Failed to select layout {index}: {message}")]
    SelectFailed { index: u32, message: String },
}

/// Host lock-key state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockState {
    pub caps_lock: bool,
    pub num_lock: bool,
}

/// Host keyboard layout control
pub trait LayoutController {
    /// Index of the active layout group
    fn current(&mut self) -> Result<u32, LayoutError>;

    /// Activate a layout group
    fn select(&mut self, index: u32) -> Result<(), LayoutError>;

    /// Lock-key state, when the backend can see it
    fn lock_state(&mut self) -> Option<LockState> {
        None
    }
}

impl<L: LayoutController + ?Sized> LayoutController for Box<L> {
    fn current(&mut self) -> Result<u32, LayoutError> {
        (**self).current()
    }

    fn select(&mut self, index: u32) -> Result<(), LayoutError> {
        (**self).select(index)
    }

    fn lock_state(&mut self) -> Option<LockState> {
        (**self).lock_state()
    }
}
