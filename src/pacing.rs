//! Simulated typing pace
//!
//! Output is delayed in proportion to its length so the dialogue reads at
//! human speed. Speed is in words per minute at five characters per word.

use crate::surface::PresentationSurface;
use std::time::Duration;

const CHARS_PER_WORD: f64 = 5.0;
const DEFAULT_WORDS_PER_MINUTE: f64 = 100.0;

fn is_valid_speed(words_per_minute: f64) -> bool {
    words_per_minute.is_finite() && words_per_minute > 0.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacer {
    typing: bool,
    words_per_minute: f64,
}

impl Pacer {
    /// Speeds that are not finite and positive fall back to the default
    pub fn new(typing: bool, words_per_minute: f64) -> Self {
        let words_per_minute = if is_valid_speed(words_per_minute) {
            words_per_minute
        } else {
            tracing::warn!(words_per_minute, "Invalid typing speed, using default");
            DEFAULT_WORDS_PER_MINUTE
        };
        Self {
            typing,
            words_per_minute,
        }
    }

    pub fn typing(&self) -> bool {
        self.typing
    }

    pub fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
    }

    pub fn words_per_minute(&self) -> f64 {
        self.words_per_minute
    }

    /// Change the speed; a speed that is not finite and positive is ignored
    pub fn set_words_per_minute(&mut self, words_per_minute: f64) {
        if !is_valid_speed(words_per_minute) {
            tracing::warn!(
                words_per_minute,
                current = self.words_per_minute,
                "Ignoring invalid typing speed"
            );
            return;
        }
        self.words_per_minute = words_per_minute;
    }

    /// Delay for `units` characters; zero when typing is off. Saturates at
    /// [`Duration::MAX`] for absurdly slow speeds.
    #[allow(clippy::cast_precision_loss)]
    pub fn delay_for(&self, units: usize) -> Duration {
        if !self.typing {
            return Duration::ZERO;
        }
        let chars_per_minute = CHARS_PER_WORD * self.words_per_minute;
        Duration::try_from_secs_f64(units as f64 * 60.0 / chars_per_minute)
            .unwrap_or(Duration::MAX)
    }

    /// Wait for `units` characters' worth of typing, wrapped in the surface's
    /// working indicator when `with_indicator` is set. No-op when typing is
    /// off.
    pub async fn pause(
        &self,
        surface: &dyn PresentationSurface,
        units: usize,
        with_indicator: bool,
    ) {
        if !self.typing {
            return;
        }
        let delay = self.delay_for(units);
        tracing::trace!(units, delay_ms = %delay.as_millis(), "Pacing");

        if with_indicator {
            surface.show_ellipsis().await;
        }
        tokio::time::sleep(delay).await;
        if with_indicator {
            surface.hide_ellipsis().await;
        }
    }
}
