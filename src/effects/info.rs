//! Introspection records describing transition handlers.
//!
//! These records feed diagnostics and tooling (transition logs, tree
//! dumps). Execution never consults them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a handler does when it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandlerKind {
    /// Enqueue a message into the machine.
    Post,
    /// Arm a timer bound to the state's lifetime.
    Schedule,
    /// Run several handlers in declared order.
    Sequence,
}

impl HandlerKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Schedule => "schedule",
            Self::Sequence => "sequence",
        }
    }
}

/// Description of a handler: its kind, optional label, the message type it
/// produces and, for composite handlers, the descriptions of its members.
///
/// # Example
///
/// ```rust
/// use statetree::effects::{HandlerKind, TransitionHandlerInfo};
///
/// let info = TransitionHandlerInfo::new(HandlerKind::Post, "Tick").with_label("heartbeat");
/// assert_eq!(info.to_string(), "post<Tick> \"heartbeat\"");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionHandlerInfo {
    pub kind: HandlerKind,
    pub entries: Vec<TransitionHandlerInfo>,
    pub label: Option<String>,
    pub message_type: String,
}

impl TransitionHandlerInfo {
    pub fn new(kind: HandlerKind, message_type: impl Into<String>) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            label: None,
            message_type: message_type.into(),
        }
    }

    /// Info for a handler producing messages of type `M`.
    pub fn of<M>(kind: HandlerKind) -> Self {
        Self::new(kind, std::any::type_name::<M>())
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_entries(mut self, entries: Vec<TransitionHandlerInfo>) -> Self {
        self.entries = entries;
        self
    }

    pub fn is_composite(&self) -> bool {
        !self.entries.is_empty()
    }
}

impl fmt::Display for TransitionHandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.kind.name(), self.message_type)?;
        if let Some(label) = &self.label {
            write!(f, " {label:?}")?;
        }
        if self.is_composite() {
            f.write_str(" [")?;
            for (i, entry) in self.entries.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{entry}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
