//! Application setup: connect, then run the terminal loop.

use std::io::{self, BufRead};
use std::thread;

use anyhow::{Context, bail};
use crossbeam_channel::{Receiver, select, unbounded};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::models::{ConnectionEvent, ServerConnection, SessionEvent};
use crate::ui::{TerminalUi, UiAction};

/// Connect to the configured server and play until the user quits or the
/// connection ends.
pub fn run(config: &ClientConfig) -> anyhow::Result<()> {
    let mut connection = ServerConnection::connect(&config.host, config.port)
        .with_context(|| format!("could not connect to {}:{}", config.host, config.port))?;
    info!(host = %config.host, port = config.port, "connected");

    let input = spawn_stdin_reader();
    let mut ui = TerminalUi::new(io::stdout(), config.auto_ready);

    // A fresh connection starts out waiting for both players to be ready.
    let mut pending = Some(ui.handle_event(&ConnectionEvent::Session(SessionEvent::EnterWaiting))?);

    let outcome = loop {
        let action = match pending.take() {
            Some(action) => action,
            None => select! {
                recv(connection.events()) -> event => match event {
                    Ok(event) => ui.handle_event(&event)?,
                    Err(_) => UiAction::Disconnected { error: None },
                },
                recv(input) -> line => match line {
                    Ok(line) => ui.handle_input(&line)?,
                    Err(_) => UiAction::Quit,
                },
            },
        };

        match action {
            UiAction::Nothing => {}
            UiAction::Send(msg) => {
                if let Err(e) = connection.send(&msg) {
                    warn!(error = %e, "send failed");
                    ui.show_error(&e.to_string())?;
                }
            }
            UiAction::Quit => break None,
            UiAction::Disconnected { error } => break error,
        }
    };

    connection.shutdown();

    if let Some(error) = outcome {
        bail!("connection lost: {}", error);
    }
    Ok(())
}

/// Forward stdin lines over a channel so they can be selected on
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
