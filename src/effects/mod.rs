//! Transition handler descriptors built on Stillwater 0.11.0 effects.
//!
//! A handler is declared once and executed on every transition it is
//! attached to. Execution has two stages:
//!
//! - **Context**: an effect run against the live [`TransitionContext`]
//!   builds the handler's auxiliary context; this stage may suspend
//! - **Handler**: a function from the transition context to a deferred side
//!   effect, invoked by the machine on its hot path
//!
//! Two handler kinds are provided: [`post`] enqueues a message and
//! [`schedule`] arms a timer bound to the state's lifetime. Both read the
//! state's data through a checked downcast and fail with
//! [`HandlerError::MissingStateData`] when the declared type is not bound.
//!
//! Following Stillwater 0.11.0 conventions, stage-one factories return
//! `BoxedEffect` and are built with `pure()`, `fail()` and `from_fn()`.

mod context;
mod descriptor;
mod error;
mod history;
mod info;
mod post;
mod schedule;
mod sequence;

#[cfg(test)]
pub(crate) mod testing;

pub use context::{AnyMessage, HandlerContext, MessageThunk, TransitionContext};
pub use descriptor::{
    no_context, ContextFactory, HandlerFactory, HandlerFuture, TransitionHandler,
    TransitionHandlerDescriptor, TransitionHandlerSpec,
};
pub use error::HandlerError;
pub use history::{HandlerHistory, HandlerOutcome, HandlerRecord};
pub use info::{HandlerKind, TransitionHandlerInfo};
pub use post::{post, post_value};
pub use schedule::{schedule, schedule_once, schedule_periodic};
pub use sequence::HandlerSequence;
