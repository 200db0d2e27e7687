//! Execution history of transition handlers.
//!
//! Diagnostics consumers keep an immutable record of which handlers ran on
//! which state and how they ended, following the same append-returns-new
//! discipline as the rest of the crate's pure values.

use crate::core::StateKey;
use crate::effects::error::HandlerError;
use crate::effects::info::TransitionHandlerInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a handler invocation ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerOutcome {
    Completed,
    /// Rendered handler error.
    Failed(String),
}

impl HandlerOutcome {
    /// Outcome matching a handler's result.
    pub fn from_result(result: &Result<(), HandlerError>) -> Self {
        match result {
            Ok(()) => Self::Completed,
            Err(err) => Self::Failed(err.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Record of one handler invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HandlerRecord {
    /// State the handler ran for
    pub state: StateKey,
    /// Description of the handler
    pub info: TransitionHandlerInfo,
    /// When the invocation settled
    pub timestamp: DateTime<Utc>,
    pub outcome: HandlerOutcome,
}

impl HandlerRecord {
    pub fn new(state: StateKey, info: TransitionHandlerInfo, outcome: HandlerOutcome) -> Self {
        Self {
            state,
            info,
            timestamp: Utc::now(),
            outcome,
        }
    }
}

/// Ordered, immutable history of handler invocations.
///
/// # Example
///
/// ```rust
/// use statetree::core::StateKey;
/// use statetree::effects::{
///     HandlerHistory, HandlerKind, HandlerOutcome, HandlerRecord, TransitionHandlerInfo,
/// };
///
/// let history = HandlerHistory::new();
/// let record = HandlerRecord::new(
///     StateKey::new("Idle"),
///     TransitionHandlerInfo::new(HandlerKind::Post, "Ping"),
///     HandlerOutcome::Completed,
/// );
///
/// let updated = history.record(record);
/// assert_eq!(updated.records().len(), 1);
/// assert_eq!(history.records().len(), 0); // Original unchanged
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HandlerHistory {
    records: Vec<HandlerRecord>,
}

impl HandlerHistory {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Record an invocation, returning a new history.
    pub fn record(&self, record: HandlerRecord) -> Self {
        let mut records = self.records.clone();
        records.push(record);
        Self { records }
    }

    pub fn records(&self) -> &[HandlerRecord] {
        &self.records
    }

    /// Invocations that ended in an error.
    pub fn failures(&self) -> impl Iterator<Item = &HandlerRecord> {
        self.records.iter().filter(|r| r.outcome.is_failure())
    }

    /// Records for one state, in execution order.
    pub fn for_state<'a>(&'a self, state: &'a StateKey) -> impl Iterator<Item = &'a HandlerRecord> {
        self.records.iter().filter(move |r| &r.state == state)
    }

    /// Time between the first and last recorded invocation.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.records.first(), self.records.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }
}
