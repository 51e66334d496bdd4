// Relayout Condition Compiler
// Turns rule texts like `OFF:(CTRL|ALT) SEQ:(F12:1,F12:0)` into compiled predicates

use crate::config::Templates;
use regex::Regex;
use std::fmt;

/// Errors raised while compiling a rule text
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("Found more than one {clause} clause in a rule of {group}")]
    DuplicateClause { group: String, clause: ClauseKind },

    #[error("Invalid pattern for {clause} clause of {group}: {message}")]
    InvalidPattern {
        group: String,
        clause: ClauseKind,
        message: String,
    },
}

/// The three clause kinds of the rule grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Off,
    On,
    Seq,
}

impl ClauseKind {
    const ALL: [ClauseKind; 3] = [ClauseKind::Off, ClauseKind::On, ClauseKind::Seq];

    /// `KEYWORD:(body)` at the start of the text or after whitespace. The body
    /// runs to the last `)` before the next whitespace and keeps its parentheses.
    fn extractor(self) -> Result<Regex, regex::Error> {
        Regex::new(&format!(r"(?:^|\s){}:(\(\S*\))", self))
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClauseKind::Off => write!(f, "OFF"),
            ClauseKind::On => write!(f, "ON"),
            ClauseKind::Seq => write!(f, "SEQ"),
        }
    }
}

/// Compile a clause body anchored to the end of its subject
fn anchored(body: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("{}$", body.trim_end_matches('$')))
}

/// A rule with its optional conditions. Absent conditions are satisfied.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Source text after template expansion
    pub text: String,
    pub off: Option<Regex>,
    pub on: Option<Regex>,
    pub seq: Option<Regex>,
}

impl CompiledRule {
    /// True iff no held modifier matches the `OFF:` pattern
    pub fn off_satisfied<'a>(&self, mut held: impl Iterator<Item = &'a str>) -> bool {
        match &self.off {
            Some(re) => !held.any(|name| re.is_match(name)),
            None => true,
        }
    }

    /// True iff at least one held modifier matches the `ON:` pattern
    pub fn on_satisfied<'a>(&self, mut held: impl Iterator<Item = &'a str>) -> bool {
        match &self.on {
            Some(re) => held.any(|name| re.is_match(name)),
            None => true,
        }
    }

    /// Match the `SEQ:` pattern against the probe tail.
    ///
    /// Returns the matched suffix, an empty string when the rule has no
    /// sequence clause, or `None` when the sequence does not match.
    pub fn seq_match<'t>(&self, tail: &'t str) -> Option<&'t str> {
        match &self.seq {
            Some(re) => re.find(tail).map(|m| m.as_str()),
            None => Some(""),
        }
    }
}

/// Compile one rule text. `group` names the owning rule group in errors.
pub fn compile(text: &str, templates: &Templates, group: &str) -> Result<CompiledRule, CompileError> {
    let expanded = templates.expand(text);
    let mut rule = CompiledRule {
        text: expanded.clone(),
        off: None,
        on: None,
        seq: None,
    };

    for kind in ClauseKind::ALL {
        let invalid = |e: regex::Error| CompileError::InvalidPattern {
            group: group.to_string(),
            clause: kind,
            message: e.to_string(),
        };
        let extractor = kind.extractor().map_err(invalid)?;
        let mut bodies = extractor
            .captures_iter(&expanded)
            .filter_map(|c| c.get(1).map(|m| m.as_str()));

        let Some(body) = bodies.next() else {
            continue;
        };
        if bodies.next().is_some() {
            return Err(CompileError::DuplicateClause {
                group: group.to_string(),
                clause: kind,
            });
        }

        let re = anchored(body).map_err(invalid)?;
        log::debug!("{} {}: {}", group, kind, re.as_str());

        match kind {
            ClauseKind::Off => rule.off = Some(re),
            ClauseKind::On => rule.on = Some(re),
            ClauseKind::Seq => rule.seq = Some(re),
        }
    }

    Ok(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn templates() -> Templates {
        let mut entries = IndexMap::new();
        entries.insert("WORD".to_string(), "([0-9A-Z]|DOT)".to_string());
        Templates::new(entries)
    }

    #[test]
    fn test_all_clauses() {
        let rule = compile(
            "OFF:(CTRL|ALT)  ON:(SHIFT) SEQ:(F12:1,F12:0)",
            &templates(),
            "Action.RetypeWord",
        )
        .unwrap();

        assert_eq!(rule.off.as_ref().unwrap().as_str(), "(CTRL|ALT)$");
        assert_eq!(rule.on.as_ref().unwrap().as_str(), "(SHIFT)$");
        assert_eq!(rule.seq.as_ref().unwrap().as_str(), "(F12:1,F12:0)$");
    }

    #[test]
    fn test_nested_parentheses_and_templates() {
        let rule = compile("SEQ:((@WORD@:1),(SPACE:0))", &templates(), "NewWord").unwrap();
        assert_eq!(
            rule.seq.as_ref().unwrap().as_str(),
            "((([0-9A-Z]|DOT):1),(SPACE:0))$"
        );
        assert!(rule.off.is_none());
        assert!(rule.on.is_none());
    }

    #[test]
    fn test_trailing_anchor_is_not_doubled() {
        let rule = compile("SEQ:(A:0)$", &templates(), "NewWord").unwrap();
        assert_eq!(rule.seq.as_ref().unwrap().as_str(), "(A:0)$");
    }

    #[test]
    fn test_off_keyword_does_not_count_as_on() {
        let rule = compile("OFF:(CTRL)", &templates(), "NewWord").unwrap();
        assert!(rule.off.is_some());
        assert!(rule.on.is_none());
    }

    #[test]
    fn test_duplicate_seq_fails() {
        let err = compile("SEQ:(A:1) SEQ:(A:0)", &templates(), "Compose").unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateClause {
                group: "Compose".to_string(),
                clause: ClauseKind::Seq
            }
        );

        let err = compile("OFF:(A) SEQ:(B:1) OFF:(C)", &templates(), "NewWord").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateClause { clause: ClauseKind::Off, .. }));
    }

    #[test]
    fn test_invalid_pattern_reports_group() {
        let err = compile("SEQ:((A:1)", &templates(), "Action.Broken").unwrap_err();
        match err {
            CompileError::InvalidPattern { group, clause, .. } => {
                assert_eq!(group, "Action.Broken");
                assert_eq!(clause, ClauseKind::Seq);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_predicates() {
        let rule = compile("OFF:(CTRL|ALT) SEQ:(A:1,A:0)", &templates(), "g").unwrap();
        assert!(rule.off_satisfied(["L_SHIFT"].into_iter()));
        assert!(!rule.off_satisfied(["L_SHIFT", "R_CTRL"].into_iter()));
        assert!(rule.on_satisfied(std::iter::empty()));
        assert_eq!(rule.seq_match("B:1,A:1,A:0"), Some("A:1,A:0"));
        assert_eq!(rule.seq_match("A:1,A:0,B:1"), None);

        let on = compile("ON:(WORD)", &templates(), "g").unwrap();
        assert!(!on.on_satisfied(std::iter::empty()));
        assert!(on.on_satisfied(["L_CTRL", "WORD"].into_iter()));
        assert_eq!(on.seq_match("anything"), Some(""));
    }
}
