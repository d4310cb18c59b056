//! Prefix-to-namespace mapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered map from prefix labels (without `:`) to namespace IRIs.
///
/// Declaration order is preserved so that rendered `PREFIX` lines are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMapping {
    map: IndexMap<String, String>,
}

impl PrefixMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `prefix` (a trailing `:` is ignored), returning the
    /// namespace it replaced.
    pub fn set_prefix(
        &mut self,
        prefix: impl AsRef<str>,
        namespace: impl Into<String>,
    ) -> Option<String> {
        let prefix = prefix.as_ref();
        let prefix = prefix.strip_suffix(':').unwrap_or(prefix);
        self.map.insert(prefix.to_string(), namespace.into())
    }

    /// Removes a prefix.
    pub fn remove_prefix(&mut self, prefix: &str) -> Option<String> {
        self.map.shift_remove(prefix)
    }

    /// Returns the namespace registered for `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.map.get(prefix).map(String::as_str)
    }

    /// Expands `prefix:local` to a full IRI.
    #[must_use]
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.namespace(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Copies every prefix of `other` not already declared here.
    ///
    /// Existing declarations win. Returns the prefixes whose namespaces
    /// disagreed.
    pub fn merge(&mut self, other: &PrefixMapping) -> Vec<String> {
        let mut conflicts = Vec::new();
        for (prefix, namespace) in &other.map {
            match self.map.get(prefix) {
                Some(existing) if existing != namespace => conflicts.push(prefix.clone()),
                Some(_) => {}
                None => {
                    self.map.insert(prefix.clone(), namespace.clone());
                }
            }
        }
        conflicts
    }

    /// Iterates `(prefix, namespace)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// Number of declared prefixes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no prefix is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
