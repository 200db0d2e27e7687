//! The finished, immutable state tree.

use crate::builder::context::NodeMap;
use crate::builder::node::TreeNode;
use crate::core::{StateData, StateKey};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Immutable tree of states plus a key index over all of its nodes.
///
/// The tree is freely shared for reads once built; nothing mutates it.
#[derive(Clone)]
pub struct StateTree {
    root: Arc<TreeNode>,
    nodes: NodeMap,
}

impl StateTree {
    pub(crate) fn new(root: Arc<TreeNode>, nodes: NodeMap) -> Self {
        Self { root, nodes }
    }

    /// The single root node.
    pub fn root(&self) -> &Arc<TreeNode> {
        &self.root
    }

    /// Node registered under `key`, anywhere in the tree.
    pub fn get(&self, key: &str) -> Option<&Arc<TreeNode>> {
        self.nodes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &StateKey> {
        self.nodes.keys()
    }

    /// All nodes in depth-first, declared order starting at the root.
    pub fn nodes(&self) -> Vec<&Arc<TreeNode>> {
        fn walk<'a>(node: &'a Arc<TreeNode>, out: &mut Vec<&'a Arc<TreeNode>>) {
            out.push(node);
            for child in node.children() {
                walk(child, out);
            }
        }

        let mut out = Vec::with_capacity(self.nodes.len());
        walk(&self.root, &mut out);
        out
    }

    /// Leaf states in declared order.
    pub fn leaves(&self) -> Vec<&Arc<TreeNode>> {
        self.nodes().into_iter().filter(|n| n.is_leaf()).collect()
    }

    /// Keys from `key` up to the root, inclusive on both ends.
    pub fn path_to_root(&self, key: &str) -> Option<Vec<StateKey>> {
        let node = self.get(key)?;
        let mut path = vec![node.key().clone()];
        path.extend(node.ancestors().iter().map(|a| a.key().clone()));
        Some(path)
    }

    /// Check whether `key` lies strictly below `ancestor`.
    pub fn is_descendant(&self, key: &str, ancestor: &str) -> bool {
        self.get(key).is_some_and(|node| {
            node.ancestors()
                .iter()
                .any(|a| a.key().as_str() == ancestor)
        })
    }

    /// Deepest node that is `a` or an ancestor of `a`, and likewise for `b`.
    ///
    /// Entering `b` from `a` exits every state below this node on `a`'s side
    /// and enters every state below it on `b`'s side.
    pub fn common_ancestor(&self, a: &str, b: &str) -> Option<&Arc<TreeNode>> {
        let on_b_side: HashSet<StateKey> = self.path_to_root(b)?.into_iter().collect();
        self.path_to_root(a)?
            .into_iter()
            .find(|key| on_b_side.contains(key))
            .and_then(|key| self.get(key.as_str()))
    }

    /// Follow initial-child rules from `key` down to a leaf.
    ///
    /// `data_of` supplies the data each composite state would be entered
    /// with, for rules that select a child dynamically. Returns `None` when a
    /// rule names no existing child.
    pub fn initial_leaf<F>(&self, key: &str, data_of: F) -> Option<&Arc<TreeNode>>
    where
        F: Fn(&StateKey) -> Option<StateData>,
    {
        let mut current = self.get(key)?;
        while !current.is_leaf() {
            let data = data_of(current.key());
            current = current.initial_child(data.as_ref())?;
        }
        Some(current)
    }

    /// [`initial_leaf`](Self::initial_leaf) without state data.
    pub fn default_leaf(&self, key: &str) -> Option<&Arc<TreeNode>> {
        self.initial_leaf(key, |_| None)
    }
}

impl fmt::Debug for StateTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&StateKey> = self.nodes().iter().map(|n| n.key()).collect();
        f.debug_struct("StateTree")
            .field("root", self.root.key())
            .field("nodes", &keys)
            .finish()
    }
}
