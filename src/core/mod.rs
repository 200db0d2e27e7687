//! Core value types shared by the tree builder and the handlers.
//!
//! This module contains the pure building blocks of a state tree:
//! - Keys and node kinds
//! - State behavior and the type-erased data it binds
//! - Message filters attached to nodes
//!
//! Nothing in this module performs side effects.

mod filter;
mod key;
mod state;

pub use filter::{passes_all, MessageFilter, StateFilter};
pub use key::{NodeKind, StateKey};
pub use state::{
    data_factory, no_data, DataState, Metadata, NoData, StateBehavior, StateData, StateFactory,
};
