//! Post handlers: compute a message and enqueue it into the machine.

use crate::effects::context::{HandlerContext, TransitionContext};
use crate::effects::descriptor::{
    HandlerFuture, TransitionHandler, TransitionHandlerDescriptor,
};
use crate::effects::error::HandlerError;
use crate::effects::info::{HandlerKind, TransitionHandlerInfo};
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;

/// Declare a handler that posts the message computed by `get_message`.
///
/// On every invocation the handler fetches the state's data as `D`, builds
/// a [`HandlerContext`] with the auxiliary context produced by
/// `make_context`, runs the message effect (which may suspend) and posts the
/// result exactly once. When the state has no `D` bound the handler fails
/// with [`HandlerError::MissingStateData`] and posts nothing.
pub fn post<D, C, M, Tc, G, F>(get_message: G, make_context: F) -> TransitionHandlerDescriptor<C, Tc>
where
    D: Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
    Tc: TransitionContext,
    G: Fn(&HandlerContext<'_, Tc, D, C>) -> BoxedEffect<M, HandlerError, Tc> + Send + Sync + 'static,
    F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
{
    let get_message = Arc::new(get_message);

    TransitionHandlerDescriptor::new(
        TransitionHandlerInfo::of::<M>(HandlerKind::Post),
        make_context,
        move |context: Arc<C>| -> TransitionHandler<Tc> {
            let get_message = Arc::clone(&get_message);
            Arc::new(move |transition: &Tc| -> HandlerFuture {
                let data = match transition.data_value_or_err::<D>() {
                    Ok(data) => data,
                    Err(err) => {
                        tracing::warn!(state = %transition.state_key(), error = %err, "post handler has no state data");
                        return Box::pin(std::future::ready(Err(err)));
                    }
                };

                let message = get_message(&HandlerContext {
                    transition,
                    data: &*data,
                    context: &*context,
                });

                let transition = transition.clone();
                Box::pin(async move {
                    let message = message.run(&transition).await?;
                    tracing::debug!(
                        state = %transition.state_key(),
                        message_type = std::any::type_name::<M>(),
                        "posting message"
                    );
                    transition.post(Box::new(message));
                    Ok(())
                })
            })
        },
    )
}

/// [`post`] for messages computed synchronously.
pub fn post_value<D, C, M, Tc, G, F>(
    get_message: G,
    make_context: F,
) -> TransitionHandlerDescriptor<C, Tc>
where
    D: Send + Sync + 'static,
    C: Send + Sync + 'static,
    M: Send + Sync + 'static,
    Tc: TransitionContext,
    G: Fn(&HandlerContext<'_, Tc, D, C>) -> M + Send + Sync + 'static,
    F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
{
    post(
        move |ctx: &HandlerContext<'_, Tc, D, C>| -> BoxedEffect<M, HandlerError, Tc> {
            pure(get_message(ctx)).boxed()
        },
        make_context,
    )
}
