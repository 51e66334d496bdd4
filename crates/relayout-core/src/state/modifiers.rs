// Relayout Modifier Set
// Names of the state keys currently held, plus the synthetic WORD marker

use smallvec::SmallVec;

/// Synthetic modifier held from a retype until the next word starts
pub const WORD_MARKER: &str = "WORD";

/// Set of held state-key names, in the order they went down
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierSet {
    names: SmallVec<[&'static str; 8]>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str) {
        if !self.contains(name) {
            self.names.push(name);
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| *n != name);
    }

    pub fn set(&mut self, name: &'static str, held: bool) {
        if held {
            self.insert(name);
        } else {
            self.remove(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names held in `self` but not in `other`
    pub fn missing_from<'a>(&'a self, other: &'a ModifierSet) -> impl Iterator<Item = &'static str> + 'a {
        self.names.iter().copied().filter(move |n| !other.contains(n))
    }
}
