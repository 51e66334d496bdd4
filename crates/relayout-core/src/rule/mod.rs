// Relayout Rules
// Condition compiler and the priority-ordered evaluator

mod compiler;
mod evaluator;

pub use compiler::{compile, ClauseKind, CompileError, CompiledRule};
pub use evaluator::{MatchKind, RuleGroup, RuleMatch, RuleSet};
