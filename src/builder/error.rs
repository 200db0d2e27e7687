//! Build errors for state trees.

use crate::core::StateKey;
use thiserror::Error;

/// Errors that can occur when building a state tree.
///
/// Any error aborts the whole build; no partial tree is usable.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Duplicate state key '{0}'. Every state in a tree needs a unique key")]
    DuplicateKey(StateKey),
}

impl BuildError {
    /// Key of the offending node.
    pub fn key(&self) -> &StateKey {
        match self {
            Self::DuplicateKey(key) => key,
        }
    }
}
