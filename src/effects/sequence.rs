//! Ordered composition of handlers attached to the same transition.

use crate::effects::context::TransitionContext;
use crate::effects::descriptor::{HandlerFuture, TransitionHandlerSpec};
use crate::effects::error::HandlerError;
use crate::effects::history::{HandlerHistory, HandlerOutcome, HandlerRecord};
use crate::effects::info::{HandlerKind, TransitionHandlerInfo};
use std::sync::Arc;

/// Handlers executed strictly in declared order.
///
/// Each member settles before the next starts, and the first failure stops
/// the sequence.
pub struct HandlerSequence<Tc> {
    label: Option<String>,
    handlers: Vec<Arc<dyn TransitionHandlerSpec<Tc>>>,
    info: TransitionHandlerInfo,
}

impl<Tc: TransitionContext> HandlerSequence<Tc> {
    pub fn new() -> Self {
        Self {
            label: None,
            handlers: Vec::new(),
            info: Self::describe(None, &[]),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.info = Self::describe(self.label.as_deref(), &self.handlers);
        self
    }

    /// Append a handler.
    pub fn then<H>(mut self, handler: H) -> Self
    where
        H: TransitionHandlerSpec<Tc> + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self.info = Self::describe(self.label.as_deref(), &self.handlers);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute every handler in order, appending one record per settled
    /// handler to `history`.
    pub async fn execute_recorded(
        &self,
        transition: &Tc,
        history: &HandlerHistory,
    ) -> (HandlerHistory, Result<(), HandlerError>) {
        let mut history = history.clone();
        for handler in &self.handlers {
            let result = handler.execute(transition).await;
            history = history.record(HandlerRecord::new(
                transition.state_key().clone(),
                handler.info().clone(),
                HandlerOutcome::from_result(&result),
            ));
            if result.is_err() {
                return (history, result);
            }
        }
        (history, Ok(()))
    }

    fn describe(
        label: Option<&str>,
        handlers: &[Arc<dyn TransitionHandlerSpec<Tc>>],
    ) -> TransitionHandlerInfo {
        let entries: Vec<TransitionHandlerInfo> =
            handlers.iter().map(|h| h.info().clone()).collect();
        let message_types: Vec<&str> = entries.iter().map(|e| e.message_type.as_str()).collect();

        let info = TransitionHandlerInfo::new(
            HandlerKind::Sequence,
            format!("({})", message_types.join(", ")),
        )
        .with_entries(entries);

        match label {
            Some(label) => info.with_label(label),
            None => info,
        }
    }
}

impl<Tc: TransitionContext> Default for HandlerSequence<Tc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Tc: TransitionContext> TransitionHandlerSpec<Tc> for HandlerSequence<Tc> {
    fn info(&self) -> &TransitionHandlerInfo {
        &self.info
    }

    fn execute(&self, transition: &Tc) -> HandlerFuture {
        let handlers = self.handlers.clone();
        let transition = transition.clone();
        Box::pin(async move {
            for handler in handlers {
                tracing::trace!(state = %transition.state_key(), handler = %handler.info(), "running handler");
                handler.execute(&transition).await?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::context::HandlerContext;
    use crate::effects::descriptor::no_context;
    use crate::effects::post::post_value;
    use crate::effects::schedule::schedule_once;
    use crate::effects::testing::RecordingContext;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    enum Step {
        First,
        Second,
        Tick,
    }

    type Ctx<'a, D> = HandlerContext<'a, RecordingContext, D, ()>;

    fn posting(step: Step) -> impl TransitionHandlerSpec<RecordingContext> {
        post_value(move |_ctx: &Ctx<'_, u8>| step.clone(), no_context())
    }

    #[tokio::test]
    async fn members_run_in_declared_order() {
        let sequence = HandlerSequence::new()
            .then(posting(Step::First))
            .then(posting(Step::Second));
        let tc = RecordingContext::new("Busy").with_data(0u8);

        sequence.execute(&tc).await.unwrap();

        assert_eq!(tc.posted::<Step>(), vec![Step::First, Step::Second]);
    }

    #[tokio::test]
    async fn first_failure_stops_the_sequence() {
        let sequence = HandlerSequence::new()
            .then(posting(Step::First))
            .then(post_value(|_ctx: &Ctx<'_, String>| Step::Second, no_context()))
            .then(posting(Step::Tick));
        let tc = RecordingContext::new("Busy").with_data(0u8);

        let err = sequence.execute(&tc).await.unwrap_err();

        assert!(matches!(err, HandlerError::MissingStateData { .. }));
        assert_eq!(tc.posted::<Step>(), vec![Step::First]);
    }

    #[tokio::test]
    async fn recorded_execution_tracks_outcomes() {
        let sequence = HandlerSequence::new()
            .then(posting(Step::First))
            .then(post_value(|_ctx: &Ctx<'_, String>| Step::Second, no_context()));
        let tc = RecordingContext::new("Busy").with_data(0u8);

        let (history, result) = sequence.execute_recorded(&tc, &HandlerHistory::new()).await;

        assert!(result.is_err());
        assert_eq!(history.records().len(), 2);
        assert_eq!(history.records()[0].outcome, HandlerOutcome::Completed);
        assert!(history.records()[1].outcome.is_failure());
        assert!(history.records().iter().all(|r| r.state.as_str() == "Busy"));
    }

    #[tokio::test]
    async fn sequences_nest() {
        let inner = HandlerSequence::new().then(posting(Step::Second)).then(schedule_once(
            |_ctx: &Ctx<'_, u8>| || Step::Tick,
            Duration::from_secs(3),
            no_context(),
        ));
        let outer = HandlerSequence::new().then(posting(Step::First)).then(inner);
        let tc = RecordingContext::new("Busy").with_data(0u8);

        outer.execute(&tc).await.unwrap();

        assert_eq!(tc.posted::<Step>(), vec![Step::First, Step::Second]);
        assert_eq!(tc.scheduled().len(), 1);
    }

    #[test]
    fn info_lists_members() {
        let sequence = HandlerSequence::new()
            .then(posting(Step::First))
            .then(schedule_once(
                |_ctx: &Ctx<'_, u8>| || Step::Tick,
                Duration::from_secs(1),
                no_context(),
            ))
            .with_label("on-enter");

        let info = sequence.info();
        assert_eq!(info.kind, HandlerKind::Sequence);
        assert_eq!(info.label.as_deref(), Some("on-enter"));
        assert_eq!(info.entries.len(), 2);
        assert_eq!(info.entries[0].kind, HandlerKind::Post);
        assert_eq!(info.entries[1].kind, HandlerKind::Schedule);
        assert_eq!(sequence.len(), 2);
    }

    #[tokio::test]
    async fn empty_sequence_succeeds() {
        let sequence: HandlerSequence<RecordingContext> = HandlerSequence::default();
        let tc = RecordingContext::new("Idle");

        assert!(sequence.is_empty());
        assert_eq!(sequence.execute(&tc).await, Ok(()));
    }
}
