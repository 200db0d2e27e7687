//! Schedule handlers: arm a timer bound to the scheduling state's lifetime.
//!
//! The handler only requests the timer. Cancellation on state exit belongs
//! to the transition context, so no timer handle is kept here.

use crate::effects::context::{AnyMessage, HandlerContext, MessageThunk, TransitionContext};
use crate::effects::descriptor::{HandlerFuture, TransitionHandler, TransitionHandlerDescriptor};
use crate::effects::error::HandlerError;
use crate::effects::info::{HandlerKind, TransitionHandlerInfo};
use std::sync::Arc;
use std::time::Duration;
use stillwater::effect::BoxedEffect;

/// Declare a handler that schedules a timer.
///
/// `get_value` runs synchronously against the handler context and returns
/// the value generator handed to the timer engine. The generator is invoked
/// at every firing, so periodic timers can produce fresh messages. It does
/// not see the transition context active at firing time.
pub fn schedule<D, C, M, Tc, V, G, F>(
    get_value: G,
    duration: Duration,
    periodic: bool,
    make_context: F,
) -> TransitionHandlerDescriptor<C, Tc>
where
    D: Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
    Tc: TransitionContext,
    V: Fn() -> M + Send + Sync + 'static,
    G: Fn(&HandlerContext<'_, Tc, D, C>) -> V + Send + Sync + 'static,
    F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
{
    let get_value = Arc::new(get_value);

    TransitionHandlerDescriptor::new(
        TransitionHandlerInfo::of::<M>(HandlerKind::Schedule),
        make_context,
        move |context: Arc<C>| -> TransitionHandler<Tc> {
            let get_value = Arc::clone(&get_value);
            Arc::new(move |transition: &Tc| -> HandlerFuture {
                let result = transition.data_value_or_err::<D>().map(|data| {
                    let value = get_value(&HandlerContext {
                        transition,
                        data: &*data,
                        context: &*context,
                    });
                    let thunk: MessageThunk = Arc::new(move || -> AnyMessage { Box::new(value()) });

                    tracing::debug!(
                        state = %transition.state_key(),
                        ?duration,
                        periodic,
                        "scheduling timer"
                    );
                    transition.schedule(thunk, duration, periodic);
                });

                if let Err(err) = &result {
                    tracing::warn!(state = %transition.state_key(), error = %err, "schedule handler has no state data");
                }
                Box::pin(std::future::ready(result))
            })
        },
    )
}

/// One-shot timer firing once after `duration`.
pub fn schedule_once<D, C, M, Tc, V, G, F>(
    get_value: G,
    duration: Duration,
    make_context: F,
) -> TransitionHandlerDescriptor<C, Tc>
where
    D: Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
    Tc: TransitionContext,
    V: Fn() -> M + Send + Sync + 'static,
    G: Fn(&HandlerContext<'_, Tc, D, C>) -> V + Send + Sync + 'static,
    F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
{
    schedule(get_value, duration, false, make_context)
}

/// Timer firing every `duration` until the state is exited.
pub fn schedule_periodic<D, C, M, Tc, V, G, F>(
    get_value: G,
    duration: Duration,
    make_context: F,
) -> TransitionHandlerDescriptor<C, Tc>
where
    D: Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
    Tc: TransitionContext,
    V: Fn() -> M + Send + Sync + 'static,
    G: Fn(&HandlerContext<'_, Tc, D, C>) -> V + Send + Sync + 'static,
    F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
{
    schedule(get_value, duration, true, make_context)
}
