//! State identifiers and node kinds.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque identifier of a state in a tree.
///
/// Keys are compared, hashed and ordered by their textual value. No two
/// nodes of one tree may share a key.
///
/// # Example
///
/// ```rust
/// use statetree::core::StateKey;
///
/// let key = StateKey::new("Running");
/// assert_eq!(key.as_str(), "Running");
/// assert_eq!(key, StateKey::from("Running"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Textual value of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateKey({:?})", self.0)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for StateKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&StateKey> for StateKey {
    fn from(key: &StateKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Position of a node in the state tree.
///
/// Exactly one `Root` exists per tree. `Root` and `Interior` nodes may have
/// children, leaves may not. `FinalLeaf` marks a terminal state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    /// Top of the tree, the only node without a parent.
    Root,
    /// Composite state below the root.
    Interior,
    /// Simple state.
    Leaf,
    /// Terminal simple state.
    FinalLeaf,
}

impl NodeKind {
    /// Composite nodes (`Root`, `Interior`) may own children.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Root | Self::Interior)
    }

    /// Leaves (`Leaf`, `FinalLeaf`) never own children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf | Self::FinalLeaf)
    }

    /// Terminal states accept no further transitions out.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::FinalLeaf)
    }

    /// Variant name, as rendered by `Display`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statetree::core::NodeKind;
    ///
    /// assert_eq!(NodeKind::FinalLeaf.name(), "FinalLeaf");
    /// assert_eq!(NodeKind::Interior.to_string(), "Interior");
    /// ```
    pub fn name(&self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::Interior => "Interior",
            Self::Leaf => "Leaf",
            Self::FinalLeaf => "FinalLeaf",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_compare_by_value() {
        let a = StateKey::new("A");
        let b = StateKey::from("A".to_string());
        let c = StateKey::from("C");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }

    #[test]
    fn keys_hash_by_value() {
        let mut set = HashSet::new();
        set.insert(StateKey::new("A"));
        set.insert(StateKey::new("A"));
        set.insert(StateKey::new("B"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("A"));
    }

    #[test]
    fn key_displays_raw_value() {
        let key = StateKey::new("Idle");
        assert_eq!(key.to_string(), "Idle");
        assert_eq!(format!("{key:?}"), "StateKey(\"Idle\")");
    }

    #[test]
    fn key_serializes_as_plain_string() {
        let key = StateKey::new("Idle");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"Idle\"");

        let back: StateKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn kind_classifies_nodes() {
        assert!(NodeKind::Root.is_composite());
        assert!(NodeKind::Interior.is_composite());
        assert!(!NodeKind::Leaf.is_composite());

        assert!(NodeKind::Leaf.is_leaf());
        assert!(NodeKind::FinalLeaf.is_leaf());
        assert!(!NodeKind::Root.is_leaf());

        assert!(NodeKind::FinalLeaf.is_final());
        assert!(!NodeKind::Leaf.is_final());
    }
}
