//! Fluent declaration of state trees.

use crate::builder::context::{ChildBuilder, TreeBuildContext};
use crate::builder::error::BuildError;
use crate::builder::node::{InitialChild, NodeParts, TreeNode};
use crate::builder::tree::StateTree;
use crate::codec::DataCodec;
use crate::core::{data_factory, no_data, NodeKind, StateFactory, StateFilter, StateKey};
use serde_json::Value;
use std::sync::Arc;

/// Declaration of one state and, for composite states, its children.
///
/// Children are kept as deferred build steps and only run once the parent
/// node exists, so declarations can be nested textually.
///
/// # Example
///
/// ```rust
/// use statetree::builder::StateDecl;
///
/// let tree = StateDecl::root("Door")
///     .child(StateDecl::leaf("Closed"))
///     .child(StateDecl::leaf("Open"))
///     .child(StateDecl::final_leaf("Removed"))
///     .build()
///     .unwrap();
///
/// assert_eq!(tree.len(), 4);
/// assert!(tree.get("Removed").unwrap().is_final());
/// ```
pub struct StateDecl {
    key: StateKey,
    kind: NodeKind,
    state_factory: StateFactory,
    parts: NodeParts,
    initial_child: InitialChild,
    children: Vec<ChildBuilder>,
}

impl StateDecl {
    fn new(key: impl Into<StateKey>, kind: NodeKind) -> Self {
        Self {
            key: key.into(),
            kind,
            state_factory: no_data(),
            parts: NodeParts::default(),
            initial_child: InitialChild::First,
            children: Vec::new(),
        }
    }

    /// Declare the root state. Only a root declaration can be built.
    pub fn root(key: impl Into<StateKey>) -> Self {
        Self::new(key, NodeKind::Root)
    }

    /// Declare a composite state nested under another composite.
    pub fn interior(key: impl Into<StateKey>) -> Self {
        Self::new(key, NodeKind::Interior)
    }

    /// Declare a simple state.
    pub fn leaf(key: impl Into<StateKey>) -> Self {
        Self::new(key, NodeKind::Leaf)
    }

    /// Declare a terminal simple state.
    pub fn final_leaf(key: impl Into<StateKey>) -> Self {
        Self::new(key, NodeKind::FinalLeaf)
    }

    pub fn key(&self) -> &StateKey {
        &self.key
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Set the behavior factory. Defaults to a state without data.
    pub fn behavior(mut self, state_factory: StateFactory) -> Self {
        self.state_factory = state_factory;
        self
    }

    /// Bind data produced by `generator` on every entry.
    pub fn data<D, F>(self, generator: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn() -> D + Send + Sync + 'static,
    {
        self.behavior(data_factory(generator))
    }

    /// Attach a codec for persisting this state's data.
    pub fn codec(mut self, codec: Arc<dyn DataCodec>) -> Self {
        self.parts.codec = Some(codec);
        self
    }

    /// Append a filter. The first filter added is the outermost.
    pub fn filter(mut self, filter: Arc<dyn StateFilter>) -> Self {
        self.parts.filters.push(filter);
        self
    }

    /// Add a metadata entry, replacing any previous value for `key`.
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parts.metadata.insert(key.into(), value.into());
        self
    }

    /// Set the initial-child rule (composite states only).
    pub fn initial(mut self, rule: InitialChild) -> Self {
        self.initial_child = rule;
        self
    }

    /// Add a child declaration.
    ///
    /// # Panics
    ///
    /// Panics when this declaration is a leaf.
    pub fn child(self, child: StateDecl) -> Self {
        self.child_builder(child.into_builder())
    }

    /// Add several child declarations in order.
    pub fn children<I>(self, children: I) -> Self
    where
        I: IntoIterator<Item = StateDecl>,
    {
        children.into_iter().fold(self, Self::child)
    }

    /// Add a raw deferred child build step.
    ///
    /// # Panics
    ///
    /// Panics when this declaration is a leaf.
    pub fn child_builder(mut self, builder: ChildBuilder) -> Self {
        assert!(
            self.kind.is_composite(),
            "leaf state '{}' cannot have children",
            self.key
        );
        self.children.push(builder);
        self
    }

    /// Turn the declaration into a deferred build step for its parent.
    pub fn into_builder(self) -> ChildBuilder {
        Box::new(move |ctx: &TreeBuildContext| self.build_in(ctx))
    }

    /// Build this declaration within `ctx`.
    pub fn build_in(self, ctx: &TreeBuildContext) -> Result<Arc<TreeNode>, BuildError> {
        match self.kind {
            NodeKind::Root => ctx.build_root(
                self.key,
                self.state_factory,
                self.children,
                self.initial_child,
                self.parts,
            ),
            NodeKind::Interior => ctx.build_interior(
                self.key,
                self.state_factory,
                self.children,
                self.initial_child,
                self.parts,
            ),
            NodeKind::Leaf | NodeKind::FinalLeaf => ctx.build_leaf(
                self.key,
                self.state_factory,
                self.kind.is_final(),
                self.parts,
            ),
        }
    }

    /// Build the whole tree.
    ///
    /// # Panics
    ///
    /// Panics unless this is a root declaration.
    pub fn build(self) -> Result<StateTree, BuildError> {
        assert!(
            self.kind == NodeKind::Root,
            "only a root declaration can be built into a tree, '{}' is {}",
            self.key,
            self.kind
        );

        let ctx = TreeBuildContext::new();
        let root = self.build_in(&ctx)?;
        let tree = ctx.into_tree(root);

        tracing::debug!(root = %tree.root().key(), states = tree.len(), "state tree built");
        Ok(tree)
    }
}
