//! Single-slot event gate
//!
//! A running process suspends on the gate until the presentation surface
//! posts a result for the one event it is waiting for. Only one wait may be
//! outstanding per session; events that do not match it are dropped with a
//! diagnostic and never queued.

use crate::session::SessionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// Names one outstanding request for user input: the process that asked and
/// the slot key the answer is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub owner: String,
    pub key: String,
}

impl EventId {
    pub fn new(owner: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.key)
    }
}

/// Audit log entry for an event that resolved a wait
#[derive(Debug, Clone, Serialize)]
pub struct DeliveredEvent {
    pub event_id: EventId,
    pub value: Value,
    pub at: DateTime<Utc>,
}

/// What happened to a posted event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostOutcome {
    /// Matched the outstanding wait and resolved it
    Delivered,
    /// Another event is outstanding; dropped
    Unexpected,
    /// Nothing is outstanding; dropped
    NotAwaiting,
}

struct Pending {
    event_id: EventId,
    tx: oneshot::Sender<Value>,
}

#[derive(Default)]
struct Slot {
    pending: Option<Pending>,
    delivered: Vec<DeliveredEvent>,
}

/// Cloneable handle to a session's gate. Surfaces keep a clone to post
/// results from wherever their input arrives.
#[derive(Clone, Default)]
pub struct EventGate {
    slot: Arc<Mutex<Slot>>,
}

/// A wait registered with [`EventGate::arm`]
#[derive(Debug)]
#[must_use = "an armed wait does nothing unless resolved"]
pub struct ArmedWait {
    event_id: EventId,
    rx: oneshot::Receiver<Value>,
}

impl EventGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `event_id` as the sole outstanding event.
    ///
    /// Fails with [`SessionError::GateBusy`] if a live wait is already
    /// registered. A slot whose waiter has gone away is stale and is
    /// replaced.
    pub fn arm(&self, event_id: EventId) -> Result<ArmedWait, SessionError> {
        let mut slot = self.lock();

        if let Some(pending) = &slot.pending {
            if !pending.tx.is_closed() {
                return Err(SessionError::GateBusy {
                    outstanding: pending.event_id.clone(),
                    requested: event_id,
                });
            }
            tracing::debug!(stale = %pending.event_id, "Replacing abandoned wait");
        }

        let (tx, rx) = oneshot::channel();
        slot.pending = Some(Pending {
            event_id: event_id.clone(),
            tx,
        });
        tracing::debug!(event = %event_id, "Waiting for event");
        Ok(ArmedWait { event_id, rx })
    }

    /// Deliver `value` for `event_id`.
    ///
    /// Resolves the outstanding wait when the identifiers match; otherwise
    /// the event is dropped with a diagnostic and the outstanding wait (if
    /// any) is left untouched.
    pub fn post(&self, event_id: &EventId, value: Value) -> PostOutcome {
        let mut slot = self.lock();

        let pending = match slot.pending.take() {
            Some(p) if p.event_id == *event_id => p,
            Some(p) => {
                tracing::warn!(
                    event = %event_id,
                    expected = %p.event_id,
                    "Received unexpected event which doesn't match the expected event"
                );
                slot.pending = Some(p);
                return PostOutcome::Unexpected;
            }
            None => {
                tracing::warn!(event = %event_id, "Received event when no event is expected");
                return PostOutcome::NotAwaiting;
            }
        };

        if pending.tx.send(value.clone()).is_err() {
            tracing::warn!(event = %event_id, "Waiter went away before the event arrived");
            return PostOutcome::NotAwaiting;
        }

        slot.delivered.push(DeliveredEvent {
            event_id: event_id.clone(),
            value,
            at: Utc::now(),
        });
        PostOutcome::Delivered
    }

    /// The event currently waited for, if any
    pub fn outstanding(&self) -> Option<EventId> {
        self.lock()
            .pending
            .as_ref()
            .filter(|p| !p.tx.is_closed())
            .map(|p| p.event_id.clone())
    }

    /// Every event that resolved a wait, oldest first
    pub fn delivered(&self) -> Vec<DeliveredEvent> {
        self.lock().delivered.clone()
    }
}

impl fmt::Debug for EventGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventGate")
            .field("outstanding", &self.outstanding())
            .finish_non_exhaustive()
    }
}

impl ArmedWait {
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Suspend until the matching event is posted. There is no timeout.
    pub async fn resolved(self) -> Result<Value, SessionError> {
        self.rx
            .await
            .map_err(|_| SessionError::GateClosed(self.event_id))
    }
}
