//! Session error types

use crate::gate::EventId;
use thiserror::Error;

/// Errors raised while running a process.
///
/// Events that arrive for the wrong (or no) outstanding wait are not errors;
/// the gate drops them and logs.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed `choose` buttons or `get_input` pattern, raised before any
    /// presentation call
    #[error("invalid definition: {0}")]
    Definition(String),

    /// A second wait was requested while one is still outstanding
    #[error("cannot wait for {requested}: already waiting for {outstanding}")]
    GateBusy {
        outstanding: EventId,
        requested: EventId,
    },

    /// The gate released a wait without a result
    #[error("wait for {0} was abandoned")]
    GateClosed(EventId),
}

impl SessionError {
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(message.into())
    }

    /// Whether this error came from bad script input rather than the gate
    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Definition(_))
    }
}
