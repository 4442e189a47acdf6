//! Scoped stylesheet rules and the per-mount insertion cache.

use std::collections::HashSet;
use std::fmt;

/// One `selector { body }` rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleRule {
    pub selector: String,
    pub body: String,
}

impl StyleRule {
    pub fn new(selector: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{ {} }}", self.selector, self.body)
    }
}

/// Content-addressed record of rules already injected into a document.
///
/// Rules are only ever added. The cache belongs to one mount, so its lifetime
/// is that of the document it describes.
#[derive(Debug, Default)]
pub struct StyleSheet {
    inserted: HashSet<StyleRule>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `rule`. Returns `true` the first time a (selector, body) pair
    /// is seen, meaning the caller must insert it.
    pub fn insert(&mut self, rule: &StyleRule) -> bool {
        if self.inserted.contains(rule) {
            return false;
        }
        self.inserted.insert(rule.clone())
    }

    pub fn contains(&self, rule: &StyleRule) -> bool {
        self.inserted.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.inserted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty()
    }
}
