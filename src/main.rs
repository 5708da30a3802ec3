//! Chamber - console front end
//!
//! Runs a short demo dialogue against the terminal.

use async_trait::async_trait;
use chamber::console::ConsoleSurface;
use chamber::{ButtonSpec, InputKind, Methods, Process, Session, SessionConfig, SessionError};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Greets the user and hands over to the survey
struct Welcome;

#[async_trait]
impl Process for Welcome {
    fn name(&self) -> &str {
        "welcome"
    }

    async fn run(
        &self,
        m: &mut Methods<'_>,
        _args: Vec<Value>,
    ) -> Result<Option<Value>, SessionError> {
        m.chat("Hello! Welcome to the chamber.").await;
        m.chat("What should I call you?").await;
        let name = m
            .get_input(
                "Name",
                InputKind::Text,
                Some(r"\S"),
                Some("I didn't catch that."),
            )
            .await?;
        let name = name.as_str().unwrap_or("friend").to_string();

        m.chat(&format!("Nice to meet you, {name}. How are you today?")).await;
        let great: Box<dyn Fn() + Send + Sync> =
            Box::new(|| tracing::info!("User is doing great"));
        let so_so: Box<dyn Fn() + Send + Sync> =
            Box::new(|| tracing::info!("User is doing so-so"));
        m.choose("mood", ButtonSpec::actions([("Great", great), ("So-so", so_so)]))
            .await?;

        if m.get_value("mood").and_then(Value::as_str) == Some("Great") {
            m.chat("Wonderful!").await;
        } else {
            m.chat("Let's see if we can cheer you up.").await;
        }

        let survey = m.run((&Survey, "survey"), vec![]).await?;
        let age = survey.get("age").cloned().unwrap_or(Value::Null);
        m.chat(&format!("Thanks {name}! You told me you are {age}.")).await;
        Ok(None)
    }
}

/// Asks a couple of questions in its own scope
struct Survey;

#[async_trait]
impl Process for Survey {
    fn name(&self) -> &str {
        "survey"
    }

    async fn run(
        &self,
        m: &mut Methods<'_>,
        _args: Vec<Value>,
    ) -> Result<Option<Value>, SessionError> {
        m.chat("How old are you?").await;
        m.get_input("age", InputKind::Int, Some("^[0-9]+$"), Some("Please enter digits only."))
            .await?;
        m.chat("Which do you prefer?").await;
        m.choose("pet", ["Cats", "Dogs", "Neither"]).await?;
        Ok(None)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chamber=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = SessionConfig::from_env();
    tracing::info!(?config, "Starting chamber");

    let surface = ConsoleSurface::new();
    let input_closed = surface.closed();
    let mut session = Session::new(config, surface);
    let session_id = session.id().to_string();

    tokio::select! {
        result = session.start(&Welcome, vec![]) => {
            let vars = result?;
            println!("{}", serde_json::to_string_pretty(&vars)?);
        }
        () = input_closed.notified() => {
            tracing::info!(session_id = %session_id, "Input closed before the dialogue finished");
        }
    }

    Ok(())
}
