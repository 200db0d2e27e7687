//! Construction of immutable state trees.
//!
//! A tree is built in one top-down pass. Each composite state derives a
//! child-scoped [`TreeBuildContext`] whose current parent is the node being
//! created, then runs the deferred build steps of its children in declared
//! order. Every node is registered in a shared key map; registering a key
//! twice fails with [`BuildError::DuplicateKey`] and aborts the whole build.
//!
//! [`StateDecl`] is the fluent front end producing those build steps.

pub mod context;
pub mod decl;
pub mod error;
pub mod node;
pub mod tree;

pub use context::{ChildBuilder, NodeMap, TreeBuildContext};
pub use decl::StateDecl;
pub use error::BuildError;
pub use node::{ChildSelector, InitialChild, NodeParts, TreeNode};
pub use tree::StateTree;
