//! Administered whitelist of methods exempt from token checks.

use std::collections::HashSet;

/// The set of fully-qualified method names that bypass token validation.
///
/// Membership is a pure lookup; request traffic never mutates the set.
#[derive(Debug, Clone, Default)]
pub struct ApiWhitelist {
    entries: HashSet<String>,
}

impl ApiWhitelist {
    /// Creates an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a method name to the whitelist.
    pub fn insert(&mut self, full_method_name: impl Into<String>) {
        self.entries.insert(full_method_name.into());
    }

    /// Returns true if the method is exempt from auth.
    pub fn contains(&self, full_method_name: &str) -> bool {
        self.entries.contains(full_method_name)
    }

    /// Returns the number of whitelisted methods.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no method is whitelisted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ApiWhitelist {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
