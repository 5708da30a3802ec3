//! The method set a running process talks to the session through

use super::{ButtonSpec, Session, SessionError, SessionMode};
use crate::gate::EventId;
use crate::surface::{InputKind, InputRequest};
use crate::vars::Vars;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;

/// Fixed pacing before listing choices, in characters
const CHOICE_LEAD_UNITS: usize = 10;
/// Fixed pacing before asking for input, in characters
const INPUT_LEAD_UNITS: usize = 10;

/// A scripted unit of dialogue.
///
/// The name qualifies the event ids of every `choose`/`get_input` call the
/// process makes, so two processes can reuse the same slot key without
/// colliding. Returning `None` makes the invocation yield its local scope.
#[async_trait]
pub trait Process: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        methods: &mut Methods<'_>,
        args: Vec<Value>,
    ) -> Result<Option<Value>, SessionError>;
}

/// A process plus the optional key its local scope is captured under
pub struct Invocation<'p> {
    pub(super) process: &'p dyn Process,
    pub(super) capture_key: Option<String>,
}

impl<'p> Invocation<'p> {
    /// Run sharing the caller's local scope
    pub fn new(process: &'p dyn Process) -> Self {
        Self {
            process,
            capture_key: None,
        }
    }

    /// Run in a fresh local scope stored under `key` in the caller's scope
    pub fn captured(process: &'p dyn Process, key: impl Into<String>) -> Self {
        Self {
            process,
            capture_key: Some(key.into()),
        }
    }
}

impl<'p, P: Process> From<&'p P> for Invocation<'p> {
    fn from(process: &'p P) -> Self {
        Self::new(process)
    }
}

impl<'p, P: Process> From<(&'p P, &str)> for Invocation<'p> {
    fn from((process, key): (&'p P, &str)) -> Self {
        Self::captured(process, key)
    }
}

/// Session operations bound to one running process
pub struct Methods<'s> {
    session: &'s mut Session,
    owner: String,
}

impl<'s> Methods<'s> {
    pub(super) fn new(session: &'s mut Session, owner: impl Into<String>) -> Self {
        Self {
            session,
            owner: owner.into(),
        }
    }

    /// Name of the process these methods are bound to
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn event_id(&self, key: &str) -> EventId {
        EventId::new(self.owner.clone(), key)
    }

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    /// Write a variable; uppercase-initial keys are global
    pub fn set_value(&mut self, key: &str, value: impl Into<Value>) -> Value {
        self.session.store.set_value(key, value.into())
    }

    /// Read a variable; uppercase-initial keys are global
    pub fn get_value(&self, key: &str) -> Option<&Value> {
        self.session.store.get_value(key)
    }

    /// The whole local scope
    pub fn local_vars(&self) -> &Vars {
        self.session.store.local()
    }

    /// The whole global scope
    pub fn global_vars(&self) -> &Vars {
        self.session.store.global()
    }

    pub async fn chat(&mut self, text: &str) {
        self.session.chat(text).await;
    }

    pub async fn pause(&mut self, units: usize, with_indicator: bool) {
        self.session.pause(units, with_indicator).await;
    }

    /// Offer reply buttons and wait for the user's pick.
    ///
    /// The chosen result is stored under `choice_key` and returned; if the
    /// chosen button carries an action it runs once. Malformed buttons fail
    /// before anything is shown.
    pub async fn choose(
        &mut self,
        choice_key: &str,
        buttons: impl Into<ButtonSpec>,
    ) -> Result<Value, SessionError> {
        let buttons = buttons.into().normalize()?;
        let event_id = self.event_id(choice_key);

        let units = CHOICE_LEAD_UNITS
            + buttons
                .iter()
                .map(|b| b.text.chars().count())
                .sum::<usize>();
        self.session.pause(units, true).await;

        let wait = self.session.gate.arm(event_id.clone())?;
        self.session
            .surface
            .show_reply_buttons(&self.session.gate, &event_id, &buttons)
            .await;

        self.session
            .wait_for_event(wait, |result| {
                let chosen = buttons
                    .iter()
                    .find(|b| result.as_str() == Some(b.result.as_str()));
                match chosen {
                    Some(button) => button.fire(),
                    None => tracing::debug!(result = %result, "Result matches no offered button"),
                }
            })
            .await
    }

    /// Ask for free text, re-prompting until it matches `pattern` and
    /// converts to `kind`. The converted value is stored under `result_key`
    /// and returned.
    pub async fn get_input(
        &mut self,
        result_key: &str,
        kind: InputKind,
        pattern: Option<&str>,
        hint: Option<&str>,
    ) -> Result<Value, SessionError> {
        let regex = pattern
            .map(Regex::new)
            .transpose()
            .map_err(|e| SessionError::definition(format!("invalid input pattern: {e}")))?;
        let event_id = self.event_id(result_key);

        self.session.pause(INPUT_LEAD_UNITS, true).await;

        let mut request = InputRequest {
            kind,
            pattern: pattern.map(str::to_string),
            hint: None,
        };
        loop {
            let wait = self.session.gate.arm(event_id.clone())?;
            self.session
                .surface
                .get_user_input(&self.session.gate, &event_id, &request)
                .await;
            let raw = wait.resolved().await?;

            let text = match &raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let accepted = regex.as_ref().is_none_or(|re| re.is_match(&text));
            if let Some(value) = accepted.then(|| kind.convert(&text)).flatten() {
                return Ok(self.session.store.set_value(result_key, value));
            }

            tracing::debug!(event = %event_id, input = %text, "Rejected input, asking again");
            request.hint = hint.map(str::to_string);
        }
    }

    /// Run a sub-process; see [`Session::run`]
    pub async fn run<'p>(
        &mut self,
        invocation: impl Into<Invocation<'p>>,
        args: Vec<Value>,
    ) -> Result<Value, SessionError> {
        self.session.run(invocation, args).await
    }

    /// Ask the backend hook for a value
    pub async fn fetch(&self, keys: &[&str]) -> Option<String> {
        self.session.backend.fetch(keys).await
    }

    pub async fn show_form(&self, form: &Value) {
        self.session.surface.show_form(form).await;
    }
}
