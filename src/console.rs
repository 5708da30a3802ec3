//! Terminal presentation surface
//!
//! Prints dialogue to stdout, lists reply buttons as numbered options and
//! reads answers line by line from stdin. The typing indicator is a small
//! rotating ellipsis drawn in place on the current line.

use crate::gate::{EventGate, EventId};
use crate::session::ReplyButton;
use crate::surface::{InputKind, InputRequest, PresentationSurface};
use async_trait::async_trait;
use crossterm::{
    cursor::MoveToColumn,
    execute,
    style::Print,
    terminal::{Clear, ClearType},
};
use serde_json::Value;
use std::io::{stdout, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

const ELLIPSIS_FRAMES: [&str; 4] = [".ooo", "o.oo", "oo.o", "ooo."];
const ELLIPSIS_DELAY: Duration = Duration::from_millis(500);
const ELLIPSIS_FRAME_INTERVAL: Duration = Duration::from_millis(400);

pub struct ConsoleSurface {
    input: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
    ellipsis: Mutex<Option<JoinHandle<()>>>,
    closed: Arc<Notify>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self {
            input: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            ellipsis: Mutex::new(None),
            closed: Arc::new(Notify::new()),
        }
    }

    /// Notified once stdin reaches end of input; no further answers will
    /// be posted after that.
    pub fn closed(&self) -> Arc<Notify> {
        Arc::clone(&self.closed)
    }

    async fn read_line(&self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        if let Err(e) = stdout().flush() {
            tracing::debug!(error = %e, "Failed to flush stdout");
        }

        match self.input.lock().await.next_line().await {
            Ok(Some(line)) => Some(line),
            Ok(None) => {
                tracing::info!("Input closed");
                self.closed.notify_one();
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read input");
                self.closed.notify_one();
                None
            }
        }
    }

    fn stop_animation(&self) -> bool {
        let handle = self
            .ellipsis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

fn overwrite_line(text: &str) {
    if let Err(e) = execute!(
        stdout(),
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(text)
    ) {
        tracing::debug!(error = %e, "Failed to draw indicator");
    }
}

#[async_trait]
impl PresentationSurface for ConsoleSurface {
    async fn show_text(&self, text: &str) {
        println!("{text}");
    }

    async fn show_reply_buttons(
        &self,
        gate: &EventGate,
        event_id: &EventId,
        buttons: &[ReplyButton],
    ) {
        for (index, button) in buttons.iter().enumerate() {
            println!("{}) {}", index + 1, button.text);
        }

        let prompt = format!("Enter a number from 1 to {}: ", buttons.len());
        loop {
            let Some(line) = self.read_line(&prompt).await else {
                return;
            };
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=buttons.len()).contains(&n) => {
                    gate.post(event_id, Value::String(buttons[n - 1].result.clone()));
                    return;
                }
                _ => continue,
            }
        }
    }

    async fn get_user_input(&self, gate: &EventGate, event_id: &EventId, request: &InputRequest) {
        if let Some(hint) = &request.hint {
            println!("{hint}");
        }
        let prompt = match request.kind {
            InputKind::Text => "> ",
            InputKind::Int => "(whole number) > ",
            InputKind::Float => "(number) > ",
        };
        if let Some(line) = self.read_line(prompt).await {
            gate.post(event_id, Value::String(line));
        }
    }

    async fn show_ellipsis(&self) {
        let animation = tokio::spawn(async {
            tokio::time::sleep(ELLIPSIS_DELAY).await;
            for frame in ELLIPSIS_FRAMES.iter().cycle() {
                overwrite_line(frame);
                tokio::time::sleep(ELLIPSIS_FRAME_INTERVAL).await;
            }
        });

        let previous = self
            .ellipsis
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(animation);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    async fn hide_ellipsis(&self) {
        if self.stop_animation() {
            overwrite_line("");
        }
    }

    async fn show_form(&self, form: &Value) {
        println!("Unable to show form {form} - not implemented");
    }
}
