//! Insertion-ordered set of codes.

use std::collections::HashSet;

use crate::code::Code;

/// The set of currently registered codes.
///
/// Membership is unique by normalized form; iteration follows insertion order,
/// which is also the order entries appear in the durable file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeSet {
    order: Vec<Code>,
    members: HashSet<Code>,
}

impl CodeSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `code` is a member.
    #[must_use]
    pub fn contains(&self, code: &Code) -> bool {
        self.members.contains(code)
    }

    /// Appends `code` unless it is already present.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, code: Code) -> bool {
        if !self.members.insert(code.clone()) {
            return false;
        }
        self.order.push(code);
        true
    }

    /// Removes every entry equal to `code`.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, code: &Code) -> bool {
        if !self.members.remove(code) {
            return false;
        }
        self.order.retain(|c| c != code);
        true
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Number of codes in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if the set holds no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates codes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Code> {
        self.order.iter()
    }

    /// Returns an owned snapshot of the normalized codes in insertion order.
    #[must_use]
    pub fn to_strings(&self) -> Vec<String> {
        self.order.iter().map(|c| c.as_str().to_owned()).collect()
    }
}

impl FromIterator<Code> for CodeSet {
    fn from_iter<I: IntoIterator<Item = Code>>(iter: I) -> Self {
        let mut set = Self::new();
        for code in iter {
            set.insert(code);
        }
        set
    }
}

impl<'a> IntoIterator for &'a CodeSet {
    type Item = &'a Code;
    type IntoIter = std::slice::Iter<'a, Code>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
