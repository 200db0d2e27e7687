//! Filters: cross-cutting interceptors attached to a node.
//!
//! A filter decides whether an opaque message may reach the state it is
//! attached to. Filters are stored outermost first and evaluated in that
//! order; the first rejection wins.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Interceptor applied around a state's behavior.
pub trait StateFilter: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Check whether `message` may pass this filter.
    ///
    /// Default implementation lets everything through.
    fn allows(&self, _message: &(dyn Any + Send + Sync)) -> bool {
        true
    }
}

impl fmt::Debug for dyn StateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateFilter({})", self.name())
    }
}

/// Filter backed by a pure predicate over messages of type `M`.
///
/// Messages of any other type pass untouched.
///
/// # Example
///
/// ```rust
/// use statetree::core::{MessageFilter, StateFilter};
///
/// let even_only = MessageFilter::new("even", |n: &u32| n % 2 == 0);
///
/// assert!(even_only.allows(&4u32));
/// assert!(!even_only.allows(&3u32));
/// assert!(even_only.allows(&"not a number"));
/// ```
pub struct MessageFilter<M> {
    name: String,
    predicate: Box<dyn Fn(&M) -> bool + Send + Sync>,
}

impl<M: 'static> MessageFilter<M> {
    /// Create a filter named `name` that lets a message of type `M` through
    /// only when `predicate` returns `true`.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&M) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Wrap into the shared form stored on nodes.
    pub fn shared(self) -> Arc<dyn StateFilter>
    where
        M: Send + Sync,
    {
        Arc::new(self)
    }
}

impl<M: Send + Sync + 'static> StateFilter for MessageFilter<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn allows(&self, message: &(dyn Any + Send + Sync)) -> bool {
        message
            .downcast_ref::<M>()
            .is_none_or(|typed| (self.predicate)(typed))
    }
}

/// Run `filters` outermost first, stopping at the first rejection.
pub fn passes_all(filters: &[Arc<dyn StateFilter>], message: &(dyn Any + Send + Sync)) -> bool {
    filters.iter().all(|filter| filter.allows(message))
}
