// Relayout Action Definitions
// Named step lists from [Action.<Name>] sections and the parameters hooks read

use std::path::PathBuf;
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};

/// Prefix that marks a step (or a trigger group) as a reference to an action definition
pub const ACTION_PREFIX: &str = "Action.";

/// Built-in primitive hooks. Parsing accepts the short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum PrimitiveName {
    #[strum(to_string = "RetypeWord")]
    RetypeWord,
    #[strum(to_string = "SwitchLayoutCyclic", serialize = "Switch")]
    SwitchLayoutCyclic,
    #[strum(to_string = "SelectLayout", serialize = "Layout")]
    SelectLayout,
    #[strum(to_string = "Respawn")]
    Respawn,
    #[strum(to_string = "ExecuteExternal", serialize = "Exec")]
    ExecuteExternal,
}

/// Canonical spelling of a primitive name; unknown names pass through
pub fn canonical_primitive(name: &str) -> String {
    name.parse::<PrimitiveName>()
        .map(|p| p.to_string())
        .unwrap_or_else(|_| name.to_string())
}

/// One entry of an action's step list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Run another action definition (name without the `Action.` prefix)
    Chain(String),
    /// Dispatch to a registered primitive hook
    Primitive(String),
}

impl Step {
    pub fn parse(step: &str) -> Self {
        match step.strip_prefix(ACTION_PREFIX) {
            Some(name) => Step::Chain(name.to_string()),
            None => Step::Primitive(step.to_string()),
        }
    }
}

/// Where `ExecuteExternal` takes its standard input from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferSource {
    Word,
    Sentence,
    Text(String),
}

impl BufferSource {
    pub fn parse(value: &str) -> Self {
        match value {
            "WORD" => BufferSource::Word,
            "SENTENCE" => BufferSource::Sentence,
            other => BufferSource::Text(other.to_string()),
        }
    }
}

/// Parameters available to primitive hooks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionParams {
    pub layout: Option<u32>,
    pub layouts: Vec<u32>,
    pub exec: Option<String>,
    pub wait: bool,
    pub timeout: Option<Duration>,
    pub send_buffer: Option<BufferSource>,
    pub use_shell: bool,
    pub directory: Option<PathBuf>,
    pub clean_env: bool,
    pub environment: Vec<String>,
    pub uid: Option<String>,
    pub gid: Option<String>,
    pub max_reply: Option<usize>,
}

/// A compiled `[Action.<Name>]` section
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDefinition {
    pub name: String,
    pub steps: Vec<Step>,
    pub params: ActionParams,
}

impl ActionDefinition {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            steps,
            params: ActionParams::default(),
        }
    }

    pub fn with_params(mut self, params: ActionParams) -> Self {
        self.params = params;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parse() {
        assert_eq!(Step::parse("Action.CyclicSwitch"), Step::Chain("CyclicSwitch".into()));
        assert_eq!(Step::parse("RetypeWord"), Step::Primitive("RetypeWord".into()));
    }

    #[test]
    fn test_primitive_aliases() {
        assert_eq!("Switch".parse::<PrimitiveName>(), Ok(PrimitiveName::SwitchLayoutCyclic));
        assert_eq!("Layout".parse::<PrimitiveName>(), Ok(PrimitiveName::SelectLayout));
        assert_eq!("Exec".parse::<PrimitiveName>(), Ok(PrimitiveName::ExecuteExternal));
        assert_eq!(canonical_primitive("Switch"), "SwitchLayoutCyclic");
        assert_eq!(canonical_primitive("Beep"), "Beep");
    }

    #[test]
    fn test_buffer_source() {
        assert_eq!(BufferSource::parse("WORD"), BufferSource::Word);
        assert_eq!(BufferSource::parse("SENTENCE"), BufferSource::Sentence);
        assert_eq!(
            BufferSource::parse("hello\n"),
            BufferSource::Text("hello\n".into())
        );
    }
}
