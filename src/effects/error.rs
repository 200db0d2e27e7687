//! Transition handler errors.

use crate::core::StateKey;
use thiserror::Error;

/// Errors surfaced while executing a transition handler.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HandlerError {
    /// The running state has no data of the type the handler was declared
    /// with. This is an authoring error and is never retried.
    #[error("State '{state}' has no data of type {expected}")]
    MissingStateData {
        state: StateKey,
        expected: &'static str,
    },

    /// A user-supplied context or message effect failed.
    #[error("Handler context failed: {0}")]
    ContextFailed(String),
}

impl HandlerError {
    /// Structural errors point at a mismatch between the declared tree and
    /// the running machine.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::MissingStateData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_data_names_state_and_type() {
        let err = HandlerError::MissingStateData {
            state: StateKey::new("Open"),
            expected: "u32",
        };

        assert_eq!(err.to_string(), "State 'Open' has no data of type u32");
        assert!(err.is_structural());
    }

    #[test]
    fn context_failure_is_not_structural() {
        let err = HandlerError::ContextFailed("lookup failed".to_string());
        assert_eq!(err.to_string(), "Handler context failed: lookup failed");
        assert!(!err.is_structural());
    }
}
