//! Contract with the running machine's transition context.

use crate::core::{StateData, StateKey};
use crate::effects::error::HandlerError;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

/// Message handed to the machine's queue. Opaque to this crate.
pub type AnyMessage = Box<dyn Any + Send + Sync>;

/// Value generator invoked by the timer engine each time a timer fires.
pub type MessageThunk = Arc<dyn Fn() -> AnyMessage + Send + Sync>;

/// Live context of a transition, provided by the running machine.
///
/// The machine owns the message queue and the timer engine; handlers only
/// request work from it. Implementations are cheap handles (typically an
/// `Arc` around the machine's shared state), hence the `Clone` bound.
///
/// Timers armed through [`schedule`](Self::schedule) must be cancelled by the
/// implementation when the state that scheduled them is exited.
pub trait TransitionContext: Clone + Send + Sync + 'static {
    /// Key of the state whose handler is running.
    fn state_key(&self) -> &StateKey;

    /// Data bound to that state, if any.
    fn state_data(&self) -> Option<StateData>;

    /// Enqueue `message` for asynchronous delivery to the machine.
    fn post(&self, message: AnyMessage);

    /// Arm a timer delivering `value()` after `duration`, repeatedly when
    /// `periodic` is set.
    fn schedule(&self, value: MessageThunk, duration: Duration, periodic: bool);

    /// Typed access to the state's data.
    ///
    /// Fails with [`HandlerError::MissingStateData`] when no data is bound or
    /// the bound data is not a `D`.
    fn data_value_or_err<D>(&self) -> Result<Arc<D>, HandlerError>
    where
        D: Send + Sync + 'static,
    {
        self.state_data()
            .and_then(|data| data.downcast::<D>().ok())
            .ok_or_else(|| HandlerError::MissingStateData {
                state: self.state_key().clone(),
                expected: std::any::type_name::<D>(),
            })
    }
}

/// Everything a handler can see while it runs: the live transition context,
/// the state's typed data and the auxiliary context built for it.
pub struct HandlerContext<'a, Tc, D, C> {
    pub transition: &'a Tc,
    pub data: &'a D,
    pub context: &'a C,
}

impl<'a, Tc: TransitionContext, D, C> HandlerContext<'a, Tc, D, C> {
    pub fn state_key(&self) -> &'a StateKey {
        self.transition.state_key()
    }
}
