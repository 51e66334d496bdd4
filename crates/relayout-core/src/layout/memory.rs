// In-memory layout controller

use super::{LayoutController, LayoutError, LockState};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct MemoryState {
    current: u32,
    locks: Option<LockState>,
    selections: Vec<u32>,
}

/// Layout controller that only remembers what was selected.
///
/// Clones share state, so tests keep a handle to inspect selections.
#[derive(Debug, Clone, Default)]
pub struct MemoryLayout {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryLayout {
    pub fn new(current: u32) -> Self {
        let layout = Self::default();
        layout.state.lock().current = current;
        layout
    }

    /// Report lock state from now on
    pub fn with_locks(self, locks: LockState) -> Self {
        self.state.lock().locks = Some(locks);
        self
    }

    /// Change the layout behind the engine's back, as the user would
    pub fn set_current(&self, index: u32) {
        self.state.lock().current = index;
    }

    pub fn set_locks(&self, locks: LockState) {
        self.state.lock().locks = Some(locks);
    }

    /// Every index passed to `select`, in order
    pub fn selections(&self) -> Vec<u32> {
        self.state.lock().selections.clone()
    }

    pub fn current_index(&self) -> u32 {
        self.state.lock().current
    }
}

impl LayoutController for MemoryLayout {
    fn current(&mut self) -> Result<u32, LayoutError> {
        Ok(self.state.lock().current)
    }

    fn select(&mut self, index: u32) -> Result<(), LayoutError> {
        let mut state = self.state.lock();
        state.current = index;
        state.selections.push(index);
        Ok(())
    }

    fn lock_state(&mut self) -> Option<LockState> {
        self.state.lock().locks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_layout_records_selections() {
        let handle = MemoryLayout::new(0);
        let mut layout: Box<dyn LayoutController> = Box::new(handle.clone());
        layout.select(1).unwrap();
        layout.select(0).unwrap();
        assert_eq!(handle.selections(), vec![1, 0]);
        assert_eq!(layout.current().unwrap(), 0);
        assert_eq!(layout.lock_state(), None);

        handle.set_locks(LockState {
            caps_lock: true,
            num_lock: false,
        });
        assert!(layout.lock_state().unwrap().caps_lock);
    }
}
