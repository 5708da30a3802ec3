//! Trait abstractions for the session's collaborators
//!
//! The presentation surface renders output and collects input; the backend
//! hook answers lookups. Both are implemented outside the core so sessions
//! can run against a console, a chat widget, or test mocks.

use crate::gate::{EventGate, EventId};
use crate::session::ReplyButton;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::sync::Arc;

/// The value kind a free-text answer is converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    Text,
    Int,
    Float,
}

impl InputKind {
    /// Convert a raw answer, or `None` if it is not a valid value of this
    /// kind. Text is kept verbatim; numbers ignore surrounding whitespace.
    pub fn convert(self, raw: &str) -> Option<Value> {
        match self {
            Self::Text => Some(Value::String(raw.to_string())),
            Self::Int => raw.trim().parse::<i64>().ok().map(Value::from),
            Self::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
        }
    }
}

/// A request for free-text input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub kind: InputKind,
    pub pattern: Option<String>,
    /// Set only when re-prompting after a rejected answer
    pub hint: Option<String>,
}

/// Renders dialogue output and collects user responses.
///
/// Methods that ask for a response must eventually call
/// [`EventGate::post`] with the given event id, either before returning or
/// later from whatever task owns the input channel.
#[async_trait]
pub trait PresentationSurface: Send + Sync {
    async fn show_text(&self, text: &str);

    async fn show_reply_buttons(
        &self,
        gate: &EventGate,
        event_id: &EventId,
        buttons: &[ReplyButton],
    );

    async fn get_user_input(&self, gate: &EventGate, event_id: &EventId, request: &InputRequest);

    /// Start the "working" indicator
    async fn show_ellipsis(&self);

    /// Stop the "working" indicator
    async fn hide_ellipsis(&self);

    /// Reserved for structured forms
    async fn show_form(&self, form: &Value) {
        tracing::warn!(form = %form, "Unable to show form - not implemented");
    }
}

/// Lookup hook for data held outside the session
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch(&self, keys: &[&str]) -> Option<String>;
}

/// Backend that knows nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl Backend for NullBackend {
    async fn fetch(&self, keys: &[&str]) -> Option<String> {
        tracing::debug!(?keys, "No backend configured");
        None
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: PresentationSurface + ?Sized> PresentationSurface for Arc<T> {
    async fn show_text(&self, text: &str) {
        (**self).show_text(text).await;
    }

    async fn show_reply_buttons(
        &self,
        gate: &EventGate,
        event_id: &EventId,
        buttons: &[ReplyButton],
    ) {
        (**self).show_reply_buttons(gate, event_id, buttons).await;
    }

    async fn get_user_input(&self, gate: &EventGate, event_id: &EventId, request: &InputRequest) {
        (**self).get_user_input(gate, event_id, request).await;
    }

    async fn show_ellipsis(&self) {
        (**self).show_ellipsis().await;
    }

    async fn hide_ellipsis(&self) {
        (**self).hide_ellipsis().await;
    }

    async fn show_form(&self, form: &Value) {
        (**self).show_form(form).await;
    }
}

#[async_trait]
impl<T: Backend + ?Sized> Backend for Arc<T> {
    async fn fetch(&self, keys: &[&str]) -> Option<String> {
        (**self).fetch(keys).await
    }
}
