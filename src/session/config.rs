//! Session configuration

use serde::{Deserialize, Serialize};

const DEFAULT_TYPING_SPEED: f64 = 100.0;

/// How the surface is expected to present the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    Chat,
    Form,
}

/// Configuration for a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Simulate typing before output
    pub typing: bool,
    /// Typing speed in words per minute
    pub typing_speed: f64,
    pub mode: SessionMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            typing: true,
            typing_speed: DEFAULT_TYPING_SPEED,
            mode: SessionMode::Chat,
        }
    }
}

impl SessionConfig {
    /// Read `CHAMBER_TYPING`, `CHAMBER_TYPING_SPEED` and `CHAMBER_MODE`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let typing = lookup("CHAMBER_TYPING").map_or(defaults.typing, |v| {
            !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no")
        });

        let typing_speed = match lookup("CHAMBER_TYPING_SPEED") {
            None => defaults.typing_speed,
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
                _ => {
                    tracing::warn!(value = %raw, "Invalid CHAMBER_TYPING_SPEED, using default");
                    defaults.typing_speed
                }
            },
        };

        let mode = match lookup("CHAMBER_MODE").as_deref().map(str::trim) {
            None => defaults.mode,
            Some("chat") => SessionMode::Chat,
            Some("form") => SessionMode::Form,
            Some(other) => {
                tracing::warn!(value = %other, "Unknown CHAMBER_MODE, using chat");
                SessionMode::Chat
            }
        };

        Self {
            typing,
            typing_speed,
            mode,
        }
    }

    #[must_use]
    pub fn without_typing(mut self) -> Self {
        self.typing = false;
        self
    }
}
