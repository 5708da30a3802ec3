//! Conversation session
//!
//! A session owns one variable store and one event gate and runs processes
//! against them. Execution is a single cooperative flow: the only places a
//! process yields are pacing delays and the single outstanding wait on the
//! gate. Sessions must never share a store or a gate.

mod buttons;
mod config;
mod error;
mod methods;

pub use buttons::{ButtonAction, ButtonSpec, ReplyButton, ReplyEffect};
pub use config::{SessionConfig, SessionMode};
pub use error::SessionError;
pub use methods::{Invocation, Methods, Process};

use crate::gate::{ArmedWait, DeliveredEvent, EventGate};
use crate::pacing::Pacer;
use crate::surface::{Backend, NullBackend, PresentationSurface};
use crate::vars::VariableStore;
use serde_json::Value;
use std::sync::Arc;

pub struct Session {
    id: String,
    mode: SessionMode,
    pacer: Pacer,
    store: VariableStore,
    gate: EventGate,
    surface: Arc<dyn PresentationSurface>,
    backend: Arc<dyn Backend>,
}

impl Session {
    pub fn new(config: SessionConfig, surface: impl PresentationSurface + 'static) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode: config.mode,
            pacer: Pacer::new(config.typing, config.typing_speed),
            store: VariableStore::new(),
            gate: EventGate::new(),
            surface: Arc::new(surface),
            backend: Arc::new(NullBackend),
        }
    }

    /// Replace the backend lookup hook
    #[must_use]
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Handle for posting results; surfaces keep a clone of this
    pub fn gate(&self) -> &EventGate {
        &self.gate
    }

    pub fn vars(&self) -> &VariableStore {
        &self.store
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.pacer.set_typing(typing);
    }

    pub fn set_typing_speed(&mut self, words_per_minute: f64) {
        self.pacer.set_words_per_minute(words_per_minute);
    }

    /// Every event that resolved a wait in this session, oldest first
    pub fn user_events(&self) -> Vec<DeliveredEvent> {
        self.gate.delivered()
    }

    /// Run the root process of the session
    pub async fn start<'p>(
        &mut self,
        invocation: impl Into<Invocation<'p>>,
        args: Vec<Value>,
    ) -> Result<Value, SessionError> {
        let invocation = invocation.into();
        tracing::info!(
            session_id = %self.id,
            process = %invocation.process.name(),
            "Starting session"
        );

        let result = self.run(invocation, args).await;

        match &result {
            Ok(_) => tracing::info!(
                session_id = %self.id,
                events = self.gate.delivered().len(),
                "Session finished"
            ),
            Err(e) => tracing::error!(session_id = %self.id, error = %e, "Session failed"),
        }
        result
    }

    /// Run a process.
    ///
    /// With a capture key the process gets a fresh local scope whose final
    /// contents end up under that key in the caller's scope; otherwise it
    /// shares the caller's scope. The caller's scope is restored before this
    /// returns, on success and on error. Yields the process's own result, or
    /// its local scope when it returns none.
    pub async fn run<'p>(
        &mut self,
        invocation: impl Into<Invocation<'p>>,
        args: Vec<Value>,
    ) -> Result<Value, SessionError> {
        let Invocation {
            process,
            capture_key,
        } = invocation.into();
        let name = process.name().to_string();

        tracing::debug!(
            session_id = %self.id,
            process = %name,
            capture_key = ?capture_key,
            depth = self.store.depth(),
            "Running process"
        );

        let token = self.store.enter_scope(capture_key.as_deref());
        let outcome = {
            let mut methods = Methods::new(self, name.as_str());
            process.run(&mut methods, args).await
        };
        let scope = self.store.exit_scope(token);

        match outcome {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Ok(scope),
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    process = %name,
                    error = %e,
                    "Process failed"
                );
                Err(e)
            }
        }
    }

    /// Show `text` after a typing delay proportional to its length
    pub async fn chat(&self, text: &str) {
        self.pause(text.chars().count(), true).await;
        self.surface.show_text(text).await;
    }

    pub async fn pause(&self, units: usize, with_indicator: bool) {
        self.pacer
            .pause(self.surface.as_ref(), units, with_indicator)
            .await;
    }

    /// Suspend on an armed wait, store the result under the event's key,
    /// then hand it to `on_resolved`
    async fn wait_for_event(
        &mut self,
        wait: ArmedWait,
        on_resolved: impl FnOnce(&Value),
    ) -> Result<Value, SessionError> {
        let key = wait.event_id().key.clone();
        let result = wait.resolved().await?;
        let result = self.store.set_value(&key, result);
        on_resolved(&result);
        Ok(result)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("pacer", &self.pacer)
            .field("store", &self.store)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
