//! In-memory transition context used by the unit tests.

use crate::core::{StateData, StateKey};
use crate::effects::context::{AnyMessage, MessageThunk, TransitionContext};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
pub(crate) struct ScheduledTimer {
    pub value: MessageThunk,
    pub duration: Duration,
    pub periodic: bool,
}

#[derive(Default)]
struct Recorded {
    posted: Vec<AnyMessage>,
    scheduled: Vec<ScheduledTimer>,
}

#[derive(Clone)]
pub(crate) struct RecordingContext {
    key: StateKey,
    data: Option<StateData>,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingContext {
    pub fn new(key: &str) -> Self {
        Self {
            key: StateKey::new(key),
            data: None,
            recorded: Arc::default(),
        }
    }

    pub fn with_data<D: Send + Sync + 'static>(mut self, data: D) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    pub fn posted_count(&self) -> usize {
        self.recorded.lock().unwrap().posted.len()
    }

    pub fn posted<M: Clone + 'static>(&self) -> Vec<M> {
        self.recorded
            .lock()
            .unwrap()
            .posted
            .iter()
            .filter_map(|m| m.downcast_ref::<M>().cloned())
            .collect()
    }

    pub fn scheduled(&self) -> Vec<ScheduledTimer> {
        self.recorded.lock().unwrap().scheduled.clone()
    }
}

impl TransitionContext for RecordingContext {
    fn state_key(&self) -> &StateKey {
        &self.key
    }

    fn state_data(&self) -> Option<StateData> {
        self.data.clone()
    }

    fn post(&self, message: AnyMessage) {
        self.recorded.lock().unwrap().posted.push(message);
    }

    fn schedule(&self, value: MessageThunk, duration: Duration, periodic: bool) {
        self.recorded.lock().unwrap().scheduled.push(ScheduledTimer {
            value,
            duration,
            periodic,
        });
    }
}
