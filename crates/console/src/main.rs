mod app;
mod cli;
mod client;
mod config;
mod controller;
mod events;
mod session;
mod terminal;
mod ui;

use crate::app::AppState;
use crate::cli::Args;
use crate::client::ApiClient;
use crate::config::load_config;
use crate::controller::spawn_controller;
use crate::events::ControllerCommand;
use crate::terminal::{init_tracing, restore_terminal, setup_terminal};
use crate::ui::{draw_ui, handle_key_event};
use clap::Parser;
use crossterm::event::{self, Event};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _file_guard = init_tracing(&args.log_dir, args.log_to_stderr)?;

    let config = load_config(args.config.as_deref())?;
    let backend = args
        .backend
        .clone()
        .unwrap_or_else(|| config.backend_url.clone());
    info!(backend = %backend, "console starting");

    let client = ApiClient::new(&backend)?;
    let (event_tx, mut event_rx) = mpsc::channel(256);
    let cmd_tx = spawn_controller(client, config.download_path.clone(), event_tx);

    // A previously completed run's chart appears without user action.
    let _ = cmd_tx.try_send(ControllerCommand::LoadSnapshots);

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(&config.form);

    let tick_rate = Duration::from_millis(100);
    loop {
        while let Ok(event) = event_rx.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|frame| draw_ui(frame, &app, config.color_scheme))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(key, &mut app, &cmd_tx) {
                    break;
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    info!("console shutting down");
    Ok(())
}
