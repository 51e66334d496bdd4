// Relayout Primitive Hooks
// The interface action steps dispatch to

use crate::action::ActionDefinition;
use crate::config::Config;
use crate::layout::{LayoutController, LayoutError};
use crate::output::{KeySink, OutputError};
use crate::state::Session;

/// Failure of a primitive hook. The chain logs it and moves on.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("Failed to start process: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("[Action.{action}] is missing {parameter}")]
    MissingParameter {
        action: String,
        parameter: &'static str,
    },
}

/// Everything a hook may touch while it runs
pub struct HookContext<'a> {
    /// Definition whose step is running; parameters come from here
    pub action: &'a ActionDefinition,
    pub config: &'a Config,
    pub session: &'a mut Session,
    pub sink: &'a mut dyn KeySink,
    pub layout: &'a mut dyn LayoutController,
}

impl HookContext<'_> {
    pub fn missing(&self, parameter: &'static str) -> HookError {
        HookError::MissingParameter {
            action: self.action.name.clone(),
            parameter,
        }
    }
}

/// A primitive hook registered by name
pub trait Primitive {
    fn call(&mut self, ctx: &mut HookContext<'_>) -> Result<(), HookError>;
}

impl<F> Primitive for F
where
    F: FnMut(&mut HookContext<'_>) -> Result<(), HookError>,
{
    fn call(&mut self, ctx: &mut HookContext<'_>) -> Result<(), HookError> {
        self(ctx)
    }
}
