//! Runtime state behavior and the data a state carries.
//!
//! Every node of a tree owns a factory producing its behavior instance. The
//! tree itself stays homogeneous: per-state data is stored behind the
//! existential [`StateData`] handle and only recovered with a checked
//! downcast by the handlers that declared its type.

use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased data bound to an active state.
pub type StateData = Arc<dyn Any + Send + Sync>;

/// Author-supplied metadata attached to a node. Opaque to the core.
pub type Metadata = BTreeMap<String, Value>;

/// Factory producing the runtime behavior instance of a node.
pub type StateFactory = Arc<dyn Fn() -> Box<dyn StateBehavior> + Send + Sync>;

/// Runtime behavior of a state, produced by the node's [`StateFactory`]
/// each time the running machine instantiates the state.
///
/// # Example
///
/// ```rust
/// use statetree::core::{StateBehavior, StateData};
/// use std::sync::Arc;
///
/// struct Counter;
///
/// impl StateBehavior for Counter {
///     fn initial_data(&self) -> Option<StateData> {
///         Some(Arc::new(0u32))
///     }
/// }
///
/// let data = Counter.initial_data().unwrap();
/// assert_eq!(data.downcast_ref::<u32>(), Some(&0));
/// ```
pub trait StateBehavior: Send + Sync {
    /// Data the state is entered with.
    ///
    /// Default implementation binds no data.
    fn initial_data(&self) -> Option<StateData> {
        None
    }

    /// Name of the concrete data type, for diagnostics.
    fn data_type_name(&self) -> &'static str {
        "()"
    }
}

/// Behavior for states that carry no data.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoData;

impl StateBehavior for NoData {}

/// Behavior whose only job is to produce a fresh value of `D` on entry.
pub struct DataState<D> {
    generator: Arc<dyn Fn() -> D + Send + Sync>,
    _phantom: PhantomData<fn() -> D>,
}

impl<D: Send + Sync + 'static> DataState<D> {
    pub fn new<F>(generator: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        Self {
            generator: Arc::new(generator),
            _phantom: PhantomData,
        }
    }
}

impl<D> Clone for DataState<D> {
    fn clone(&self) -> Self {
        Self {
            generator: Arc::clone(&self.generator),
            _phantom: PhantomData,
        }
    }
}

impl<D> fmt::Debug for DataState<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataState")
            .field("data_type", &std::any::type_name::<D>())
            .finish()
    }
}

impl<D: Send + Sync + 'static> StateBehavior for DataState<D> {
    fn initial_data(&self) -> Option<StateData> {
        Some(Arc::new((self.generator)()))
    }

    fn data_type_name(&self) -> &'static str {
        std::any::type_name::<D>()
    }
}

/// Factory for states without data.
pub fn no_data() -> StateFactory {
    Arc::new(|| Box::new(NoData))
}

/// Factory for states whose data is produced by `generator` on every entry.
pub fn data_factory<D, F>(generator: F) -> StateFactory
where
    D: Send + Sync + 'static,
    F: Fn() -> D + Send + Sync + 'static,
{
    let state = DataState::new(generator);
    Arc::new(move || Box::new(state.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Door {
        open: bool,
    }

    #[test]
    fn no_data_binds_nothing() {
        let behavior = (no_data())();
        assert!(behavior.initial_data().is_none());
        assert_eq!(behavior.data_type_name(), "()");
    }

    #[test]
    fn data_factory_produces_typed_data() {
        let factory = data_factory(|| Door { open: false });
        let behavior = factory();

        let data = behavior.initial_data().unwrap();
        assert_eq!(data.downcast_ref::<Door>(), Some(&Door { open: false }));
        assert!(behavior.data_type_name().ends_with("Door"));
    }

    #[test]
    fn generator_runs_on_every_entry() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let factory = data_factory(move || counted.fetch_add(1, Ordering::SeqCst));

        let first = factory().initial_data().unwrap();
        let second = factory().initial_data().unwrap();

        assert_eq!(first.downcast_ref::<usize>(), Some(&0));
        assert_eq!(second.downcast_ref::<usize>(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn wrong_type_does_not_downcast() {
        let data = data_factory(|| 7u8)().initial_data().unwrap();
        assert!(data.downcast_ref::<u16>().is_none());
    }
}
