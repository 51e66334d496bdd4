// Relayout Rule Evaluator
// Tests the modifier set and probe tail against the rule groups in fixed priority order

use super::compiler::CompiledRule;
use crate::role::KeyRoleTable;
use crate::state::{EventBuffer, ModifierSet};
use regex::Regex;

/// Named ordered list of rules; the first satisfied rule wins
#[derive(Debug, Clone)]
pub struct RuleGroup {
    pub name: String,
    pub rules: Vec<CompiledRule>,
}

impl RuleGroup {
    pub fn new(name: impl Into<String>, rules: Vec<CompiledRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Which group produced a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchKind {
    NewSentence,
    Compose,
    NewWord,
    /// Custom trigger group, carrying the action name (without `Action.`)
    Custom(String),
}

/// Result of a successful evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub kind: MatchKind,
    /// Index of the winning rule inside its group
    pub rule: usize,
    /// Trailing probe events of the trigger that also sit in the Word buffer
    pub extra: usize,
}

/// Every compiled rule of the `[Actions]` section
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// Maximum number of probe events rendered into the tail
    pub seq_length: usize,
    /// Pattern selecting `NAME:code` tokens that produced a character
    pub word_chars: Regex,
    pub new_sentence: RuleGroup,
    pub compose: RuleGroup,
    pub new_word: RuleGroup,
    /// Trigger groups in declaration order
    pub custom: Vec<RuleGroup>,
}

impl RuleSet {
    /// Evaluate NewSentence, Compose, NewWord, then custom groups.
    /// The first satisfied rule anywhere in that order wins.
    pub fn evaluate(
        &self,
        modifiers: &ModifierSet,
        probe: &EventBuffer,
        roles: &KeyRoleTable,
    ) -> Option<RuleMatch> {
        let tail = probe.tail(self.seq_length);
        log::trace!("{}", tail);

        let fixed = [
            (&self.new_sentence, MatchKind::NewSentence),
            (&self.compose, MatchKind::Compose),
            (&self.new_word, MatchKind::NewWord),
        ];
        let custom = self
            .custom
            .iter()
            .map(|group| (group, MatchKind::Custom(group.name.clone())));

        for (group, kind) in fixed.into_iter().chain(custom) {
            if let Some((rule, matched)) = first_match(group, modifiers, &tail) {
                let extra = extra_count(matched, probe, roles);
                log::debug!("{}: {}", group.name, tail);
                return Some(RuleMatch { kind, rule, extra });
            }
        }
        None
    }
}

fn first_match<'t>(
    group: &RuleGroup,
    modifiers: &ModifierSet,
    tail: &'t str,
) -> Option<(usize, &'t str)> {
    group.rules.iter().enumerate().find_map(|(idx, rule)| {
        if !rule.off_satisfied(modifiers.iter()) || !rule.on_satisfied(modifiers.iter()) {
            return None;
        }
        rule.seq_match(tail).map(|matched| (idx, matched))
    })
}

/// Count the trailing events covered by the matched tail that are collected
/// into the Word buffer. Rules without a sequence clause cover nothing.
fn extra_count(matched: &str, probe: &EventBuffer, roles: &KeyRoleTable) -> usize {
    if matched.is_empty() {
        return 0;
    }
    let segments = matched.matches(',').count() + 1;
    probe
        .iter()
        .rev()
        .take(segments)
        .filter(|event| roles.is_collected(event.key))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Templates;
    use crate::event::KeyEvent;
    use crate::rule::compile;
    use crate::Key;

    const A: Key = Key(30);
    const F12: Key = Key(88);

    fn group(name: &str, texts: &[&str]) -> RuleGroup {
        let templates = Templates::default();
        RuleGroup::new(
            name,
            texts
                .iter()
                .map(|t| compile(t, &templates, name).unwrap())
                .collect(),
        )
    }

    fn rules() -> RuleSet {
        RuleSet {
            seq_length: 4,
            word_chars: Regex::new("^A:0$").unwrap(),
            new_sentence: group("NewSentence", &["SEQ:(ESC:0)"]),
            compose: group("Compose", &[]),
            new_word: group("NewWord", &["SEQ:(SPACE:0)"]),
            custom: vec![
                group("RetypeWord", &["OFF:(CTRL|ALT) SEQ:(F12:1,F12:0)"]),
                group("Fallback", &["SEQ:(:0)"]),
            ],
        }
    }

    fn roles() -> KeyRoleTable {
        KeyRoleTable::compile(
            &["A".to_string(), "SPACE".to_string()],
            &[],
            &["F12".to_string()],
            &["L_CTRL".to_string()],
        )
        .unwrap()
    }

    fn probe(events: &[KeyEvent]) -> EventBuffer {
        let mut buf = EventBuffer::default();
        for e in events {
            buf.push(*e);
        }
        buf
    }

    #[test]
    fn test_fixed_groups_before_custom() {
        let rules = rules();
        let probe = probe(&[KeyEvent::press(Key::SPACE), KeyEvent::release(Key::SPACE)]);
        let m = rules
            .evaluate(&ModifierSet::default(), &probe, &roles())
            .unwrap();
        // `Fallback` also matches `SPACE:0`; NewWord has priority
        assert_eq!(m.kind, MatchKind::NewWord);
        assert_eq!(m.extra, 1);
    }

    #[test]
    fn test_first_custom_group_wins() {
        let rules = rules();
        let probe = probe(&[KeyEvent::press(F12), KeyEvent::release(F12)]);
        let m = rules
            .evaluate(&ModifierSet::default(), &probe, &roles())
            .unwrap();
        assert_eq!(m.kind, MatchKind::Custom("RetypeWord".to_string()));
        // F12 is a test key, never part of a word
        assert_eq!(m.extra, 0);
    }

    #[test]
    fn test_off_condition_blocks_rule() {
        let rules = rules();
        let probe = probe(&[KeyEvent::press(F12), KeyEvent::release(F12)]);
        let mut mods = ModifierSet::default();
        mods.insert("L_CTRL");
        let m = rules.evaluate(&mods, &probe, &roles()).unwrap();
        assert_eq!(m.kind, MatchKind::Custom("Fallback".to_string()));
    }

    #[test]
    fn test_extra_counts_collected_events_only() {
        let rules = RuleSet {
            custom: vec![group("Mixed", &["SEQ:(A:0,F12:1,F12:0)"])],
            ..rules()
        };
        let probe = probe(&[
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::press(F12),
            KeyEvent::release(F12),
        ]);
        let m = rules
            .evaluate(&ModifierSet::default(), &probe, &roles())
            .unwrap();
        assert_eq!(m.extra, 1);
    }

    #[test]
    fn test_tail_limited_to_seq_length() {
        let rules = RuleSet {
            custom: vec![group("Long", &["SEQ:(A:1,A:0,A:1,A:0,A:1)"])],
            ..rules()
        };
        let probe = probe(&[
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::press(A),
            KeyEvent::release(A),
            KeyEvent::press(A),
        ]);
        assert_eq!(
            rules.evaluate(&ModifierSet::default(), &probe, &roles()),
            None
        );
    }
}
