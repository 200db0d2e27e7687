//! The two-stage handler envelope shared by every handler kind.
//!
//! Stage one builds an auxiliary context value by running an effect against
//! the transition context; it may suspend. Stage two turns that value into
//! the per-transition handler function the machine calls on its hot path.

use crate::effects::context::TransitionContext;
use crate::effects::error::HandlerError;
use crate::effects::info::TransitionHandlerInfo;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use stillwater::effect::{BoxedEffect, Effect};
use stillwater::prelude::*;

/// Deferred side effect of one handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>>>>;

/// Per-transition handler. Calling it is synchronous; awaiting the returned
/// future performs the side effect.
pub type TransitionHandler<Tc> = Arc<dyn Fn(&Tc) -> HandlerFuture + Send + Sync>;

/// Stage one: creates a fresh context effect on each invocation.
pub type ContextFactory<C, Tc> = Arc<dyn Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync>;

/// Stage two: builds the handler from the materialized context.
pub type HandlerFactory<C, Tc> = Arc<dyn Fn(Arc<C>) -> TransitionHandler<Tc> + Send + Sync>;

/// Context factory for handlers that need no auxiliary context.
pub fn no_context<Tc: TransitionContext>(
) -> impl Fn() -> BoxedEffect<(), HandlerError, Tc> + Send + Sync + 'static {
    || -> BoxedEffect<(), HandlerError, Tc> { pure(()).boxed() }
}

/// A declared transition side effect, reusable across transitions.
///
/// `C` is the auxiliary context built per invocation, `Tc` the transition
/// context type of the running machine.
pub struct TransitionHandlerDescriptor<C, Tc> {
    info: TransitionHandlerInfo,
    make_context: ContextFactory<C, Tc>,
    handler: HandlerFactory<C, Tc>,
}

impl<C, Tc> TransitionHandlerDescriptor<C, Tc>
where
    C: Send + Sync + 'static,
    Tc: TransitionContext,
{
    /// Assemble a descriptor from its two stages.
    ///
    /// `make_context` is called once per invocation for a fresh stage-one
    /// effect; `handler` turns the materialized context into the handler.
    pub fn new<F, H>(info: TransitionHandlerInfo, make_context: F, handler: H) -> Self
    where
        F: Fn() -> BoxedEffect<C, HandlerError, Tc> + Send + Sync + 'static,
        H: Fn(Arc<C>) -> TransitionHandler<Tc> + Send + Sync + 'static,
    {
        Self {
            info,
            make_context: Arc::new(make_context),
            handler: Arc::new(handler),
        }
    }

    pub fn info(&self) -> &TransitionHandlerInfo {
        &self.info
    }

    /// Attach a human label shown in diagnostics.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.info = self.info.with_label(label);
        self
    }

    /// Fresh stage-one effect.
    pub fn make_context(&self) -> BoxedEffect<C, HandlerError, Tc> {
        (self.make_context)()
    }

    /// Stage-two handler bound to `context`.
    pub fn handler(&self, context: Arc<C>) -> TransitionHandler<Tc> {
        (self.handler)(context)
    }

    /// Run both stages against `transition`.
    pub fn execute(&self, transition: &Tc) -> HandlerFuture {
        let make_context = Arc::clone(&self.make_context);
        let handler = Arc::clone(&self.handler);
        let transition = transition.clone();
        let info = self.info.clone();

        Box::pin(async move {
            tracing::trace!(state = %transition.state_key(), handler = %info, "building handler context");
            let context = make_context().run(&transition).await?;
            let handler = handler(Arc::new(context));
            handler(&transition).await
        })
    }
}

impl<C, Tc> Clone for TransitionHandlerDescriptor<C, Tc> {
    fn clone(&self) -> Self {
        Self {
            info: self.info.clone(),
            make_context: Arc::clone(&self.make_context),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// Type-erased view of a handler, so descriptors with different auxiliary
/// contexts can be grouped and executed uniformly.
pub trait TransitionHandlerSpec<Tc>: Send + Sync {
    fn info(&self) -> &TransitionHandlerInfo;

    fn execute(&self, transition: &Tc) -> HandlerFuture;
}

impl<C, Tc> TransitionHandlerSpec<Tc> for TransitionHandlerDescriptor<C, Tc>
where
    C: Send + Sync + 'static,
    Tc: TransitionContext,
{
    fn info(&self) -> &TransitionHandlerInfo {
        TransitionHandlerDescriptor::info(self)
    }

    fn execute(&self, transition: &Tc) -> HandlerFuture {
        TransitionHandlerDescriptor::execute(self, transition)
    }
}
