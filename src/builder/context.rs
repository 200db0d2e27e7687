//! Single-pass tree construction.
//!
//! A [`TreeBuildContext`] carries the "current parent" and the accumulating
//! key→node map. Descending into a composite state derives a child scope
//! that shares the map and rebinds the parent to the node being created, so
//! parent links are threaded through the recursion without any fix-up pass.

use crate::builder::error::BuildError;
use crate::builder::node::{InitialChild, NodeParts, TreeNode};
use crate::builder::tree::StateTree;
use crate::core::{NodeKind, StateFactory, StateKey};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Weak};

/// Key→node map accumulated during a build.
pub type NodeMap = HashMap<StateKey, Arc<TreeNode>>;

/// Deferred build step of a child state, run once its parent is known.
pub type ChildBuilder = Box<dyn FnOnce(&TreeBuildContext) -> Result<Arc<TreeNode>, BuildError>>;

/// State shared by every scope of one build.
#[derive(Clone, Default)]
struct BuildState {
    nodes: NodeMap,
    /// Key of the root once `build_root` has been entered.
    root: Option<StateKey>,
}

/// Transient builder-side state; not part of the built tree.
///
/// One context builds exactly one tree. After a build step fails the context
/// only holds a partial map: nodes registered before the failure stay
/// visible through [`get`](Self::get), but their composite ancestors were
/// never created, so their `parent()` is `None`. Discard the context instead
/// of reading it.
#[derive(Clone)]
pub struct TreeBuildContext {
    parent: Option<Weak<TreeNode>>,
    parent_key: Option<StateKey>,
    state: Rc<RefCell<BuildState>>,
}

impl TreeBuildContext {
    /// Top-level context: no parent, empty map.
    pub fn new() -> Self {
        Self {
            parent: None,
            parent_key: None,
            state: Rc::new(RefCell::new(BuildState::default())),
        }
    }

    /// Key of the current parent, `None` at the top level.
    pub fn parent_key(&self) -> Option<&StateKey> {
        self.parent_key.as_ref()
    }

    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    fn child_scope(&self, parent: Weak<TreeNode>, parent_key: StateKey) -> Self {
        Self {
            parent: Some(parent),
            parent_key: Some(parent_key),
            state: Rc::clone(&self.state),
        }
    }

    /// Build the root state and, recursively, its children.
    ///
    /// On error the context is left with a partial map and must be
    /// discarded.
    ///
    /// # Panics
    ///
    /// Panics when called from a child scope, or when this context already
    /// started a root: a tree has exactly one root.
    pub fn build_root(
        &self,
        key: impl Into<StateKey>,
        state_factory: StateFactory,
        children: Vec<ChildBuilder>,
        initial_child: InitialChild,
        parts: NodeParts,
    ) -> Result<Arc<TreeNode>, BuildError> {
        let key = key.into();
        assert!(
            self.parent.is_none(),
            "root state '{key}' must be built at the top level"
        );
        let existing = self.state.borrow().root.clone();
        if let Some(existing) = existing {
            panic!("root state '{key}' cannot be built: this context already built root '{existing}'");
        }
        self.state.borrow_mut().root = Some(key.clone());

        self.build_composite(NodeKind::Root, key, state_factory, children, initial_child, parts)
    }

    /// Build an interior state under the current parent.
    ///
    /// On error the context is left with a partial map and must be
    /// discarded.
    ///
    /// # Panics
    ///
    /// Panics when there is no current parent.
    pub fn build_interior(
        &self,
        key: impl Into<StateKey>,
        state_factory: StateFactory,
        children: Vec<ChildBuilder>,
        initial_child: InitialChild,
        parts: NodeParts,
    ) -> Result<Arc<TreeNode>, BuildError> {
        let key = key.into();
        assert!(
            self.parent.is_some(),
            "interior state '{key}' must be declared inside a composite state"
        );
        self.build_composite(NodeKind::Interior, key, state_factory, children, initial_child, parts)
    }

    /// Build a leaf (or final leaf) state under the current parent.
    ///
    /// # Panics
    ///
    /// Panics when there is no current parent.
    pub fn build_leaf(
        &self,
        key: impl Into<StateKey>,
        state_factory: StateFactory,
        is_final: bool,
        parts: NodeParts,
    ) -> Result<Arc<TreeNode>, BuildError> {
        let key = key.into();
        let Some(parent) = self.parent.clone() else {
            panic!("leaf state '{key}' must be declared inside a composite state");
        };

        let node = Arc::new(TreeNode {
            key,
            kind: if is_final {
                NodeKind::FinalLeaf
            } else {
                NodeKind::Leaf
            },
            parent,
            children: Vec::new(),
            state_factory,
            codec: parts.codec,
            filters: parts.filters,
            metadata: parts.metadata,
            initial_child: None,
        });

        self.register(node)
    }

    fn build_composite(
        &self,
        kind: NodeKind,
        key: StateKey,
        state_factory: StateFactory,
        children: Vec<ChildBuilder>,
        initial_child: InitialChild,
        parts: NodeParts,
    ) -> Result<Arc<TreeNode>, BuildError> {
        let mut failure = None;

        let node = Arc::new_cyclic(|me: &Weak<TreeNode>| {
            let scope = self.child_scope(me.clone(), key.clone());
            let mut built = Vec::with_capacity(children.len());
            for build_child in children {
                match build_child(&scope) {
                    Ok(child) => built.push(child),
                    Err(err) => {
                        failure = Some(err);
                        break;
                    }
                }
            }

            TreeNode {
                key,
                kind,
                parent: self.parent.clone().unwrap_or_default(),
                children: built,
                state_factory,
                codec: parts.codec,
                filters: parts.filters,
                metadata: parts.metadata,
                initial_child: Some(initial_child),
            }
        });

        if let Some(err) = failure {
            return Err(err);
        }
        self.register(node)
    }

    /// Insert `node` into the shared map.
    ///
    /// Fails with [`BuildError::DuplicateKey`] when the key is taken, leaving
    /// the map untouched.
    pub(crate) fn register(&self, node: Arc<TreeNode>) -> Result<Arc<TreeNode>, BuildError> {
        let mut state = self.state.borrow_mut();
        match state.nodes.entry(node.key().clone()) {
            Entry::Occupied(_) => {
                tracing::warn!(key = %node.key(), kind = %node.kind(), "duplicate state key");
                Err(BuildError::DuplicateKey(node.key().clone()))
            }
            Entry::Vacant(slot) => {
                tracing::debug!(
                    key = %node.key(),
                    kind = %node.kind(),
                    parent = ?self.parent_key.as_ref().map(StateKey::as_str),
                    children = node.children().len(),
                    "registered state node"
                );
                slot.insert(Arc::clone(&node));
                Ok(node)
            }
        }
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().nodes.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.state.borrow().nodes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<Arc<TreeNode>> {
        self.state.borrow().nodes.get(key).cloned()
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<StateKey> {
        let mut keys: Vec<StateKey> = self.state.borrow().nodes.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Freeze the accumulated map into a tree rooted at `root`.
    ///
    /// # Panics
    ///
    /// Panics when `root` is not a root node, or is not the node this
    /// context registered under that key.
    pub fn into_tree(self, root: Arc<TreeNode>) -> StateTree {
        assert!(
            root.is_root(),
            "state '{}' is {}, only a root can anchor a tree",
            root.key(),
            root.kind()
        );

        let state = match Rc::try_unwrap(self.state) {
            Ok(cell) => cell.into_inner(),
            Err(shared) => shared.borrow().clone(),
        };
        let registered = state
            .nodes
            .get(root.key())
            .is_some_and(|node| Arc::ptr_eq(node, &root));
        assert!(
            registered,
            "root state '{}' was not built in this context",
            root.key()
        );

        StateTree::new(root, state.nodes)
    }
}

impl Default for TreeBuildContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::no_data;

    fn leaf(key: &'static str) -> ChildBuilder {
        Box::new(move |ctx: &TreeBuildContext| {
            ctx.build_leaf(key, no_data(), false, NodeParts::default())
        })
    }

    fn final_leaf(key: &'static str) -> ChildBuilder {
        Box::new(move |ctx: &TreeBuildContext| {
            ctx.build_leaf(key, no_data(), true, NodeParts::default())
        })
    }

    fn interior(key: &'static str, children: Vec<ChildBuilder>) -> ChildBuilder {
        Box::new(move |ctx: &TreeBuildContext| {
            ctx.build_interior(key, no_data(), children, InitialChild::First, NodeParts::default())
        })
    }

    #[test]
    fn root_with_leaf_and_final_leaf() {
        let ctx = TreeBuildContext::new();
        let root = ctx
            .build_root(
                "A",
                no_data(),
                vec![leaf("B"), final_leaf("C")],
                InitialChild::First,
                NodeParts::default(),
            )
            .unwrap();

        let children: Vec<&str> = root.children().iter().map(|c| c.key().as_str()).collect();
        assert_eq!(children, vec!["B", "C"]);

        let b = ctx.get("B").unwrap();
        assert!(Arc::ptr_eq(&b.parent().unwrap(), &root));
        assert_eq!(ctx.get("C").unwrap().kind(), NodeKind::FinalLeaf);
        assert_eq!(root.kind(), NodeKind::Root);
        assert!(root.parent().is_none());
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn nested_parents_are_wired() {
        let ctx = TreeBuildContext::new();
        let root = ctx
            .build_root(
                "Machine",
                no_data(),
                vec![interior("Running", vec![leaf("Fast"), leaf("Slow")]), leaf("Stopped")],
                InitialChild::First,
                NodeParts::default(),
            )
            .unwrap();

        let running = ctx.get("Running").unwrap();
        let fast = ctx.get("Fast").unwrap();

        assert_eq!(running.kind(), NodeKind::Interior);
        assert!(Arc::ptr_eq(&running.parent().unwrap(), &root));
        assert!(Arc::ptr_eq(&fast.parent().unwrap(), &running));
        assert_eq!(fast.depth(), 2);
        assert_eq!(root.children().len(), 2);
    }

    #[test]
    fn duplicate_leaf_fails_and_keeps_first() {
        let ctx = TreeBuildContext::new();
        let result = ctx.build_root(
            "Root",
            no_data(),
            vec![leaf("X"), leaf("X")],
            InitialChild::First,
            NodeParts::default(),
        );

        assert_eq!(result.unwrap_err(), BuildError::DuplicateKey(StateKey::new("X")));
        assert!(ctx.contains("X"));
        assert!(!ctx.contains("Root"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn failed_registration_leaves_map_unchanged() {
        let ctx = TreeBuildContext::new();
        let parent = ctx
            .build_root("P", no_data(), Vec::new(), InitialChild::First, NodeParts::default())
            .unwrap();
        let scope = ctx.child_scope(Arc::downgrade(&parent), parent.key().clone());

        let first = scope
            .build_leaf("X", no_data(), false, NodeParts::default())
            .unwrap();
        let before = scope.keys();

        let err = scope
            .build_leaf("X", no_data(), true, NodeParts::default())
            .unwrap_err();

        assert_eq!(err.key().as_str(), "X");
        assert_eq!(scope.keys(), before);
        assert!(Arc::ptr_eq(&scope.get("X").unwrap(), &first));
        assert_eq!(scope.get("X").unwrap().kind(), NodeKind::Leaf);
    }

    #[test]
    fn duplicate_between_root_and_descendant() {
        let ctx = TreeBuildContext::new();
        let result = ctx.build_root(
            "Same",
            no_data(),
            vec![interior("Mid", vec![leaf("Same")])],
            InitialChild::First,
            NodeParts::default(),
        );

        assert_eq!(result.unwrap_err(), BuildError::DuplicateKey(StateKey::new("Same")));
    }

    #[test]
    fn child_scope_shares_map_and_rebinds_parent() {
        let ctx = TreeBuildContext::new();
        let root = ctx
            .build_root("R", no_data(), Vec::new(), InitialChild::First, NodeParts::default())
            .unwrap();
        let scope = ctx.child_scope(Arc::downgrade(&root), root.key().clone());

        assert!(!ctx.has_parent());
        assert!(scope.has_parent());
        assert_eq!(scope.parent_key().map(StateKey::as_str), Some("R"));

        scope
            .build_leaf("L", no_data(), false, NodeParts::default())
            .unwrap();
        assert!(ctx.contains("L"));
    }

    #[test]
    #[should_panic(expected = "must be built at the top level")]
    fn root_inside_parent_panics() {
        let ctx = TreeBuildContext::new();
        let nested_root: ChildBuilder = Box::new(|inner: &TreeBuildContext| {
            inner.build_root("Inner", no_data(), Vec::new(), InitialChild::First, NodeParts::default())
        });
        ctx.build_root(
            "Outer",
            no_data(),
            vec![nested_root],
            InitialChild::First,
            NodeParts::default(),
        )
        .unwrap();
    }

    #[test]
    #[should_panic(expected = "must be declared inside a composite state")]
    fn leaf_without_parent_panics() {
        let ctx = TreeBuildContext::new();
        let _ = ctx.build_leaf("Orphan", no_data(), false, NodeParts::default());
    }

    #[test]
    fn into_tree_freezes_all_nodes() {
        let ctx = TreeBuildContext::new();
        let root = ctx
            .build_root(
                "A",
                no_data(),
                vec![leaf("B"), final_leaf("C")],
                InitialChild::First,
                NodeParts::default(),
            )
            .unwrap();

        let tree = ctx.into_tree(root);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.nodes().len(), tree.len());
        assert!(tree.contains("C"));
    }

    #[test]
    #[should_panic(expected = "already built root 'A'")]
    fn second_root_in_same_context_panics() {
        let ctx = TreeBuildContext::new();
        ctx.build_root("A", no_data(), vec![leaf("A1")], InitialChild::First, NodeParts::default())
            .unwrap();
        let _ = ctx.build_root("B", no_data(), Vec::new(), InitialChild::First, NodeParts::default());
    }

    #[test]
    #[should_panic(expected = "already built root 'Root'")]
    fn root_after_failed_build_panics() {
        let ctx = TreeBuildContext::new();
        let _ = ctx.build_root(
            "Root",
            no_data(),
            vec![leaf("X"), leaf("X")],
            InitialChild::First,
            NodeParts::default(),
        );
        let _ = ctx.build_root("Retry", no_data(), Vec::new(), InitialChild::First, NodeParts::default());
    }

    #[test]
    fn failed_build_leaves_orphaned_partial_nodes() {
        let ctx = TreeBuildContext::new();
        let result = ctx.build_root(
            "Root",
            no_data(),
            vec![interior("Mid", vec![leaf("X")]), leaf("X")],
            InitialChild::First,
            NodeParts::default(),
        );

        assert!(result.is_err());
        let mid = ctx.get("Mid").unwrap();
        assert_eq!(mid.kind(), NodeKind::Interior);
        assert!(mid.parent().is_none());
        assert!(!ctx.contains("Root"));
    }

    #[test]
    #[should_panic(expected = "only a root can anchor a tree")]
    fn into_tree_rejects_non_root() {
        let ctx = TreeBuildContext::new();
        ctx.build_root("A", no_data(), vec![leaf("B")], InitialChild::First, NodeParts::default())
            .unwrap();
        let b = ctx.get("B").unwrap();
        let _ = ctx.into_tree(b);
    }

    #[test]
    #[should_panic(expected = "root state 'Other' was not built in this context")]
    fn into_tree_rejects_foreign_root() {
        let ctx = TreeBuildContext::new();
        ctx.build_root("A", no_data(), Vec::new(), InitialChild::First, NodeParts::default())
            .unwrap();
        let other = TreeBuildContext::new()
            .build_root("Other", no_data(), Vec::new(), InitialChild::First, NodeParts::default())
            .unwrap();
        let _ = ctx.into_tree(other);
    }
}
