// Relayout Key Roles
// Compiles the [ActionKeys] lists into a total code -> role table

use crate::config::ConfigError;
use crate::key::{key_from_name, Key, KEY_COUNT};
use strum_macros::{Display, EnumString};

/// What the engine does with events of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum KeyRole {
    /// Collected into all buffers and tested against the rules
    Add,
    /// Drops all buffers
    Drop,
    /// Tested against the rules but never part of a word
    Test,
    /// Held state is tracked in the modifier set; collected like `Add`
    StateKey,
}

impl KeyRole {
    /// Whether events of this role end up in the Word and Sentence buffers
    pub fn is_collected(self) -> bool {
        matches!(self, KeyRole::Add | KeyRole::StateKey)
    }
}

/// Role of every key code from 0 to `KEY_MAX`
#[derive(Debug, Clone)]
pub struct KeyRoleTable {
    roles: Vec<KeyRole>,
}

impl Default for KeyRoleTable {
    fn default() -> Self {
        Self {
            roles: vec![KeyRole::Test; KEY_COUNT],
        }
    }
}

impl KeyRoleTable {
    /// Build the table. Lists are applied in the order Add, Drop, Test,
    /// StateKeys; a later list overrides an earlier one for the same code.
    pub fn compile(
        add: &[String],
        drop: &[String],
        test: &[String],
        state_keys: &[String],
    ) -> Result<Self, ConfigError> {
        let mut table = Self::default();
        table.assign(add, KeyRole::Add, "Add")?;
        table.assign(drop, KeyRole::Drop, "Drop")?;
        table.assign(test, KeyRole::Test, "Test")?;
        table.assign(state_keys, KeyRole::StateKey, "StateKeys")?;
        Ok(table)
    }

    fn assign(&mut self, entries: &[String], role: KeyRole, list: &str) -> Result<(), ConfigError> {
        for entry in entries {
            let (first, last) = parse_entry(entry, list)?;
            for code in first..=last {
                self.roles[code as usize] = role;
            }
        }
        Ok(())
    }

    /// Role of a key; codes past `KEY_MAX` are tested only
    pub fn role(&self, key: Key) -> KeyRole {
        key.index()
            .map(|idx| self.roles[idx])
            .unwrap_or(KeyRole::Test)
    }

    pub fn is_collected(&self, key: Key) -> bool {
        self.role(key).is_collected()
    }

    /// Codes currently holding a role, for diagnostics
    pub fn count(&self, role: KeyRole) -> usize {
        self.roles.iter().filter(|r| **r == role).count()
    }
}

/// Resolve a list entry: a key name or an inclusive `FIRST..LAST` range
fn parse_entry(entry: &str, list: &str) -> Result<(u16, u16), ConfigError> {
    if let Some(key) = key_from_name(entry) {
        return Ok((key.code(), key.code()));
    }

    let invalid = || ConfigError::InvalidKeyRange {
        list: list.to_string(),
        entry: entry.to_string(),
    };

    let (first, last) = entry.split_once("..").ok_or_else(invalid)?;
    let first = key_from_name(first).ok_or_else(invalid)?;
    let last = key_from_name(last).ok_or_else(invalid)?;
    if first > last {
        return Err(invalid());
    }
    Ok((first.code(), last.code()))
}
