// Focused Window Provider Trait
//
// Interface for tracking which window has keyboard focus. The engine only
// needs the class name and whether focus moved since the last query.

use parking_lot::Mutex;
use std::sync::Arc;

/// Error type for window focus queries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WindowError {
    #[error("Not connected to window manager")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),
}

/// Result of a focus query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    /// Focus moved to another window since the previous query
    pub changed: bool,
    /// Class of the focused window, empty when unknown
    pub class_name: String,
}

impl FocusState {
    pub fn new(changed: bool, class_name: impl Into<String>) -> Self {
        Self {
            changed,
            class_name: class_name.into(),
        }
    }
}

/// Trait for focused-window providers
///
/// Queried synchronously by the engine before every key event.
pub trait FocusedWindowProvider {
    fn focused(&mut self) -> Result<FocusState, WindowError>;
}

impl<P: FocusedWindowProvider + ?Sized> FocusedWindowProvider for Box<P> {
    fn focused(&mut self) -> Result<FocusState, WindowError> {
        (**self).focused()
    }
}

#[derive(Debug, Default)]
struct ScriptedFocus {
    class_name: String,
    pending_change: bool,
}

/// Provider whose focus is set by the caller.
///
/// Used when no window system backend is available (a single class, reported
/// as changed once) and by tests, which keep a clone to move focus around.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    state: Arc<Mutex<ScriptedFocus>>,
}

impl ScriptedProvider {
    /// Start focused on `class_name`; the first query reports a change
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptedFocus {
                class_name: class_name.into(),
                pending_change: true,
            })),
        }
    }

    /// Move focus to another window
    pub fn focus(&self, class_name: impl Into<String>) {
        let mut state = self.state.lock();
        state.class_name = class_name.into();
        state.pending_change = true;
    }

    pub fn class_name(&self) -> String {
        self.state.lock().class_name.clone()
    }
}

impl FocusedWindowProvider for ScriptedProvider {
    fn focused(&mut self) -> Result<FocusState, WindowError> {
        let mut state = self.state.lock();
        let changed = std::mem::take(&mut state.pending_change);
        Ok(FocusState::new(changed, state.class_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reports_change_once() {
        let mut provider = ScriptedProvider::new("konsole");
        assert_eq!(provider.focused().unwrap(), FocusState::new(true, "konsole"));
        assert_eq!(provider.focused().unwrap(), FocusState::new(false, "konsole"));
    }

    #[test]
    fn test_scripted_focus_through_clone() {
        let handle = ScriptedProvider::new("");
        let mut provider: Box<dyn FocusedWindowProvider> = Box::new(handle.clone());
        provider.focused().unwrap();

        handle.focus("firefox");
        let state = provider.focused().unwrap();
        assert!(state.changed);
        assert_eq!(state.class_name, "firefox");
        assert_eq!(handle.class_name(), "firefox");
    }

    #[test]
    fn test_window_error_display() {
        assert_eq!(
            format!("{}", WindowError::NotConnected),
            "Not connected to window manager"
        );
        assert_eq!(
            format!("{}", WindowError::ConnectionFailed("test".to_string())),
            "Connection failed: test"
        );
        assert_eq!(
            format!("{}", WindowError::QueryFailed("query".to_string())),
            "Query failed: query"
        );
    }
}
