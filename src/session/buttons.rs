//! Reply buttons and the shapes `choose` accepts for them

use super::SessionError;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Zero-argument effect attached to a button
pub type ButtonAction = Arc<dyn Fn() + Send + Sync>;

/// What happens when a button's result is the one delivered
#[derive(Clone, Default)]
pub enum ReplyEffect {
    /// Only the result is reported
    #[default]
    Plain,
    /// The result is reported and the action runs
    Action(ButtonAction),
}

impl fmt::Debug for ReplyEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::Action(_) => f.write_str("Action(..)"),
        }
    }
}

/// A canonical reply button
#[derive(Debug, Clone)]
pub struct ReplyButton {
    /// Label shown to the user
    pub text: String,
    /// Value reported back to the waiting process
    pub result: String,
    pub effect: ReplyEffect,
}

impl ReplyButton {
    pub fn new(text: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            result: result.into(),
            effect: ReplyEffect::Plain,
        }
    }

    /// A button whose label is also its result
    pub fn label(label: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(label.clone(), label)
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.effect = ReplyEffect::Action(Arc::new(action));
        self
    }

    /// Run the attached action, if any
    pub fn fire(&self) {
        if let ReplyEffect::Action(action) = &self.effect {
            action();
        }
    }
}

/// The shapes accepted by `choose`
#[derive(Clone)]
pub enum ButtonSpec {
    /// Plain labels; each label is also the result
    Labels(Vec<String>),
    /// Ready-made buttons
    Buttons(Vec<ReplyButton>),
    /// Label to action, in order; each label is also the result
    Actions(Vec<(String, ButtonAction)>),
    /// Script data: an array of strings or of `{text, result}` records
    Json(Value),
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Labels(labels) => f.debug_tuple("Labels").field(labels).finish(),
            Self::Buttons(buttons) => f.debug_tuple("Buttons").field(buttons).finish(),
            Self::Actions(actions) => {
                let labels: Vec<_> = actions.iter().map(|(label, _)| label).collect();
                f.debug_tuple("Actions").field(&labels).finish()
            }
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

impl ButtonSpec {
    /// Build an action map from `(label, action)` pairs
    pub fn actions<I, L, F>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, F)>,
        L: Into<String>,
        F: Fn() + Send + Sync + 'static,
    {
        Self::Actions(
            entries
                .into_iter()
                .map(|(label, action)| (label.into(), Arc::new(action) as ButtonAction))
                .collect(),
        )
    }

    /// Normalize into canonical buttons, or fail with a definition error
    pub fn normalize(self) -> Result<Vec<ReplyButton>, SessionError> {
        let buttons = match self {
            Self::Labels(labels) => labels.into_iter().map(ReplyButton::label).collect(),
            Self::Buttons(buttons) => buttons,
            Self::Actions(actions) => actions
                .into_iter()
                .map(|(label, action)| ReplyButton {
                    effect: ReplyEffect::Action(action),
                    ..ReplyButton::label(label)
                })
                .collect(),
            Self::Json(value) => normalize_json(&value)?,
        };

        if buttons.is_empty() {
            return Err(SessionError::definition("no reply buttons given"));
        }
        Ok(buttons)
    }
}

fn normalize_json(value: &Value) -> Result<Vec<ReplyButton>, SessionError> {
    let invalid = || SessionError::definition(format!("invalid button definition: {value}"));

    let items = value.as_array().ok_or_else(invalid)?;

    if let Some(labels) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() {
        return Ok(labels.into_iter().map(ReplyButton::label).collect());
    }

    items
        .iter()
        .map(|item| {
            let text = item.get("text").and_then(Value::as_str);
            let result = item.get("result").and_then(Value::as_str);
            match (text, result) {
                (Some(text), Some(result)) => Ok(ReplyButton::new(text, result)),
                _ => Err(invalid()),
            }
        })
        .collect()
}

impl From<Vec<String>> for ButtonSpec {
    fn from(labels: Vec<String>) -> Self {
        Self::Labels(labels)
    }
}

impl From<Vec<&str>> for ButtonSpec {
    fn from(labels: Vec<&str>) -> Self {
        Self::Labels(labels.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ButtonSpec {
    fn from(labels: [&str; N]) -> Self {
        Self::Labels(labels.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<ReplyButton>> for ButtonSpec {
    fn from(buttons: Vec<ReplyButton>) -> Self {
        Self::Buttons(buttons)
    }
}

impl From<Value> for ButtonSpec {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}
