//! Immutable nodes of a built state tree.

use crate::codec::DataCodec;
use crate::core::{
    passes_all, Metadata, NodeKind, StateBehavior, StateData, StateFactory, StateFilter, StateKey,
};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Dynamic initial-child selector, evaluated against the parent's data.
pub type ChildSelector = Arc<dyn Fn(Option<&StateData>) -> Option<StateKey> + Send + Sync>;

/// Rule choosing which child of a composite state is entered by default.
#[derive(Clone, Default)]
pub enum InitialChild {
    /// First declared child.
    #[default]
    First,
    /// The direct child with this key.
    Key(StateKey),
    /// Child chosen at entry time from the parent state's data.
    Select(ChildSelector),
}

impl InitialChild {
    /// Rule naming a direct child by key.
    pub fn key(key: impl Into<StateKey>) -> Self {
        Self::Key(key.into())
    }

    /// Rule choosing the child from the parent's data on entry.
    ///
    /// # Example
    ///
    /// ```rust
    /// use statetree::builder::{InitialChild, StateDecl};
    /// use statetree::core::StateKey;
    ///
    /// let tree = StateDecl::root("Light")
    ///     .data(|| true)
    ///     .initial(InitialChild::select(|data| {
    ///         let on = data?.downcast_ref::<bool>()?;
    ///         Some(StateKey::new(if *on { "On" } else { "Off" }))
    ///     }))
    ///     .child(StateDecl::leaf("Off"))
    ///     .child(StateDecl::leaf("On"))
    ///     .build()
    ///     .unwrap();
    ///
    /// let on = std::sync::Arc::new(true) as statetree::StateData;
    /// let root = tree.root();
    /// assert_eq!(root.initial_child(Some(&on)).unwrap().key().as_str(), "On");
    /// assert!(root.initial_child(None).is_none());
    /// ```
    pub fn select<F>(selector: F) -> Self
    where
        F: Fn(Option<&StateData>) -> Option<StateKey> + Send + Sync + 'static,
    {
        Self::Select(Arc::new(selector))
    }

    /// Resolve the rule against `children`.
    ///
    /// Returns `None` when the rule names no direct child.
    pub fn resolve<'a>(
        &self,
        children: &'a [Arc<TreeNode>],
        data: Option<&StateData>,
    ) -> Option<&'a Arc<TreeNode>> {
        match self {
            Self::First => children.first(),
            Self::Key(key) => children.iter().find(|c| c.key() == key),
            Self::Select(selector) => {
                let key = selector(data)?;
                children.iter().find(|c| *c.key() == key)
            }
        }
    }
}

impl fmt::Debug for InitialChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("First"),
            Self::Key(key) => f.debug_tuple("Key").field(key).finish(),
            Self::Select(_) => f.write_str("Select(..)"),
        }
    }
}

/// Optional per-node attributes supplied by the declaration.
#[derive(Clone, Default)]
pub struct NodeParts {
    pub codec: Option<Arc<dyn DataCodec>>,
    /// Outermost first.
    pub filters: Vec<Arc<dyn StateFilter>>,
    pub metadata: Metadata,
}

/// One state of a built tree.
///
/// Nodes are created in a single build pass and never change afterwards.
/// Children are owned; the parent link is weak so the tree stays acyclic in
/// ownership terms.
pub struct TreeNode {
    pub(crate) key: StateKey,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Weak<TreeNode>,
    pub(crate) children: Vec<Arc<TreeNode>>,
    pub(crate) state_factory: StateFactory,
    pub(crate) codec: Option<Arc<dyn DataCodec>>,
    pub(crate) filters: Vec<Arc<dyn StateFilter>>,
    pub(crate) metadata: Metadata,
    pub(crate) initial_child: Option<InitialChild>,
}

impl TreeNode {
    /// Key of this state, unique within its tree.
    pub fn key(&self) -> &StateKey {
        &self.key
    }

    /// Position of this node in the tree.
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Parent node, `None` for the root.
    pub fn parent(&self) -> Option<Arc<TreeNode>> {
        self.parent.upgrade()
    }

    /// Children in declared order. Empty for leaves.
    pub fn children(&self) -> &[Arc<TreeNode>] {
        &self.children
    }

    /// Direct child with `key`.
    pub fn child(&self, key: &str) -> Option<&Arc<TreeNode>> {
        self.children.iter().find(|c| c.key.as_str() == key)
    }

    /// Check whether this is the tree's root.
    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    /// Check whether this node is a leaf, final or not.
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }

    /// Check whether this node is a terminal state.
    pub fn is_final(&self) -> bool {
        self.kind.is_final()
    }

    /// Ancestors, nearest first, ending with the root.
    pub fn ancestors(&self) -> Vec<Arc<TreeNode>> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(node) = current {
            current = node.parent();
            ancestors.push(node);
        }
        ancestors
    }

    /// Distance from the root; the root has depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().len()
    }

    /// Fresh runtime behavior instance for this state.
    pub fn create_behavior(&self) -> Box<dyn StateBehavior> {
        (self.state_factory)()
    }

    /// Codec used to persist this state's data, if one was declared.
    pub fn codec(&self) -> Option<&Arc<dyn DataCodec>> {
        self.codec.as_ref()
    }

    /// Filters attached to this state, outermost first.
    pub fn filters(&self) -> &[Arc<dyn StateFilter>] {
        &self.filters
    }

    /// Author-supplied metadata. Opaque to the tree.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Initial-child rule, present on composite nodes only.
    pub fn initial_child_rule(&self) -> Option<&InitialChild> {
        self.initial_child.as_ref()
    }

    /// Child entered by default, given this state's data.
    pub fn initial_child(&self, data: Option<&StateData>) -> Option<&Arc<TreeNode>> {
        self.initial_child
            .as_ref()
            .and_then(|rule| rule.resolve(&self.children, data))
    }

    /// Check `message` against the node's filters, outermost first.
    pub fn accepts(&self, message: &(dyn Any + Send + Sync)) -> bool {
        passes_all(&self.filters, message)
    }
}

impl fmt::Debug for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<&StateKey> = self.children.iter().map(|c| &c.key).collect();
        f.debug_struct("TreeNode")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("parent", &self.parent().map(|p| p.key.clone()))
            .field("children", &children)
            .field("codec", &self.codec)
            .field("filters", &self.filters)
            .field("metadata", &self.metadata)
            .field("initial_child", &self.initial_child)
            .finish()
    }
}
