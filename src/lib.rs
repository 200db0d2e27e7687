//! Statetree: hierarchical state trees with typed transition handlers
//!
//! Statetree is the construction and transition-execution core of a
//! hierarchical state machine. It follows Stillwater's "pure core,
//! imperative shell" philosophy: the tree is an immutable value built once,
//! while side effects are declared as handler descriptors and only performed
//! when the running machine executes them.
//!
//! # Core Concepts
//!
//! - **State tree**: Immutable nodes (`Root`, `Interior`, `Leaf`,
//!   `FinalLeaf`) built in one pass from nested declarations
//! - **State data**: Per-state typed data behind a type-erased handle,
//!   recovered by handlers with a checked downcast
//! - **Handlers**: Reusable descriptors that post messages or schedule
//!   timers through the machine's transition context
//! - **Codecs**: Pluggable persistence for state data
//!
//! # Example
//!
//! ```rust
//! use statetree::builder::{InitialChild, StateDecl};
//!
//! let tree = StateDecl::root("Door")
//!     .initial(InitialChild::key("Closed"))
//!     .child(StateDecl::leaf("Open"))
//!     .child(StateDecl::leaf("Closed").data(|| 0u32))
//!     .child(StateDecl::final_leaf("Removed"))
//!     .build()
//!     .unwrap();
//!
//! let closed = tree.get("Closed").unwrap();
//! assert_eq!(closed.parent().unwrap().key().as_str(), "Door");
//! assert_eq!(tree.default_leaf("Door").unwrap().key().as_str(), "Closed");
//! ```

pub mod builder;
pub mod codec;
pub mod core;
pub mod effects;

// Re-export commonly used types
pub use builder::{BuildError, InitialChild, StateDecl, StateTree, TreeBuildContext, TreeNode};
pub use crate::core::{NodeKind, StateData, StateKey};
pub use effects::{
    post, schedule, HandlerError, TransitionContext, TransitionHandlerDescriptor,
    TransitionHandlerInfo,
};
