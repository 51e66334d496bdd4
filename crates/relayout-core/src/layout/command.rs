// Command layout controller
// Selects layouts by running Keyboard.LayoutCommand

use super::{LayoutController, LayoutError};
use crate::exec::{CommandSpec, ProcessRunner};
use std::time::Duration;

/// Placeholder replaced by the layout index
pub const LAYOUT_PLACEHOLDER: &str = "{layout}";

/// Longest a layout command may block the event loop
pub const SELECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs a shell command to select a layout and remembers the last index.
///
/// The host's real layout is never queried, so switches made outside the
/// daemon go unnoticed.
#[derive(Debug, Clone)]
pub struct CommandLayout {
    template: String,
    current: u32,
    timeout: Duration,
}

impl CommandLayout {
    pub fn new(template: impl Into<String>, initial: u32) -> Self {
        Self {
            template: template.into(),
            current: initial,
            timeout: SELECT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Command line for a layout index
    pub fn command_for(&self, index: u32) -> String {
        self.template.replace(LAYOUT_PLACEHOLDER, &index.to_string())
    }
}

impl LayoutController for CommandLayout {
    fn current(&mut self) -> Result<u32, LayoutError> {
        Ok(self.current)
    }

    fn select(&mut self, index: u32) -> Result<(), LayoutError> {
        let command = self.command_for(index);
        log::debug!("Selecting layout {}: {}", index, command);
        let mut spec = CommandSpec::from_command_line(&command, true);
        spec.timeout = Some(self.timeout);
        let result = ProcessRunner::run(&spec);
        if result.timed_out {
            return Err(LayoutError::SelectFailed {
                index,
                message: format!("\"{}\" timed out after {:?}", command, self.timeout),
            });
        }
        if !result.success() {
            return Err(LayoutError::SelectFailed {
                index,
                message: format!(
                    "\"{}\" exited with {}: {}",
                    command,
                    result.status,
                    result.stderr_lossy().trim()
                ),
            });
        }
        self.current = index;
        Ok(())
    }
}
