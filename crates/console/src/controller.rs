use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use protocol::commands::{self, RESET_COMMAND};
use protocol::{ConsoleInput, RunConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::client::ApiClient;
use crate::events::{ControllerCommand, ControllerEvent};
use crate::session::{self, SendPlan, SessionManager};

/// Owns every backend interaction and the console session state machine.
/// Commands are processed one at a time, so the deferred-refresh flags never
/// see an interleaved poll tick and send.
pub(crate) struct Controller {
    client: Arc<ApiClient>,
    events: mpsc::Sender<ControllerEvent>,
    commands: mpsc::Sender<ControllerCommand>,
    session: SessionManager,
    download_path: PathBuf,
}

pub(crate) fn spawn_controller(
    client: ApiClient,
    download_path: PathBuf,
    events: mpsc::Sender<ControllerEvent>,
) -> mpsc::Sender<ControllerCommand> {
    let (cmd_tx, mut cmd_rx) = mpsc::channel(128);
    let mut controller = Controller {
        client: Arc::new(client),
        events,
        commands: cmd_tx.clone(),
        session: SessionManager::new(),
        download_path,
    };
    tokio::spawn(async move {
        while let Some(command) = cmd_rx.recv().await {
            controller.handle(command).await;
        }
    });
    cmd_tx
}

impl Controller {
    async fn handle(&mut self, command: ControllerCommand) {
        match command {
            ControllerCommand::SaveConfig(config) => {
                self.save_config(config).await;
            }
            ControllerCommand::SaveAndRun(config) => self.save_and_run(config).await,
            ControllerCommand::UploadInput(path) => self.upload(path).await,
            ControllerCommand::LoadSnapshots => self.load_snapshots().await,
            ControllerCommand::PollConsole => self.poll_console().await,
            ControllerCommand::ToggleConsole => self.toggle_console().await,
            ControllerCommand::SendConsoleText(text) => self.send_text(text).await,
            ControllerCommand::SetWindowSize(size) => self.set_window_size(size).await,
            ControllerCommand::QueryMinute(minute) => self.query_minute(minute).await,
            ControllerCommand::Reset => self.reset().await,
            ControllerCommand::DownloadOutput => self.download().await,
            ControllerCommand::SendCompleted { ok, error, query } => {
                self.finish_send(ok, error, query).await;
            }
        }
    }

    async fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event).await;
    }

    fn schedule(&self, command: ControllerCommand, delay: Duration) {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = commands.send(command).await;
        });
    }

    async fn save_config(&mut self, config: RunConfig) -> bool {
        match self.client.save_config(&config).await {
            Ok(()) => {
                tracing::info!(input = %config.input_file, "config saved");
                self.emit(ControllerEvent::RunStatus("config saved".to_string()))
                    .await;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "config save failed");
                self.emit(ControllerEvent::RunStatus(format!(
                    "failed to save config: {err}"
                )))
                .await;
                false
            }
        }
    }

    async fn save_and_run(&mut self, config: RunConfig) {
        if self.save_config(config.forced_batch()).await {
            self.run().await;
        }
    }

    async fn run(&mut self) {
        self.emit(ControllerEvent::RunStatus("analysis running...".to_string()))
            .await;
        match self.client.run().await {
            Ok(outcome) => {
                let status = if outcome.ok {
                    "analysis finished"
                } else {
                    "run failed"
                };
                tracing::info!(ok = outcome.ok, "run completed");
                self.emit(ControllerEvent::RunStatus(status.to_string())).await;
                self.emit(ControllerEvent::OutputPreview(
                    outcome.output_preview.unwrap_or_default(),
                ))
                .await;
                // Run output is mirrored into the console area in batch mode too.
                let mirrored =
                    mirror_std_streams(outcome.stdout.as_deref(), outcome.stderr.as_deref());
                self.emit(ControllerEvent::ConsoleOutput(mirrored)).await;
                self.load_snapshots().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "run request failed");
                self.emit(ControllerEvent::RunStatus(format!("run request failed: {err}")))
                    .await;
            }
        }
    }

    async fn upload(&mut self, path: String) {
        let path = PathBuf::from(path.trim());
        if path.as_os_str().is_empty() || !path.is_file() {
            self.emit(ControllerEvent::UploadStatus("no file selected.".to_string()))
                .await;
            return;
        }
        match self.client.upload_input(&path).await {
            Ok(response) => match (response.ok, response.config) {
                (true, Some(config)) => {
                    tracing::info!(input = %config.input_file, "input uploaded");
                    self.emit(ControllerEvent::UploadStatus(format!(
                        "uploaded and set as input: {}",
                        config.input_file
                    )))
                    .await;
                    // The server may rename or relocate the upload; its path wins.
                    self.emit(ControllerEvent::InputPathResolved(config.input_file))
                        .await;
                }
                (true, None) => {
                    self.emit(ControllerEvent::UploadStatus(
                        "uploaded and set as input".to_string(),
                    ))
                    .await;
                }
                (false, _) => {
                    self.emit(ControllerEvent::UploadStatus("upload failed".to_string()))
                        .await;
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "upload failed");
                self.emit(ControllerEvent::UploadStatus(format!("upload failed: {err}")))
                    .await;
            }
        }
    }

    /// Silent-skip on failure: prior snapshots stay untouched and the next
    /// scheduled reload gets another chance.
    async fn load_snapshots(&mut self) {
        match self.client.parsed_output().await {
            Ok(parsed) if parsed.ok => {
                let jump = self.session.flags.go_latest && !parsed.snapshots.is_empty();
                if jump {
                    self.session.flags.go_latest = false;
                }
                self.emit(ControllerEvent::SnapshotsLoaded {
                    snapshots: parsed.snapshots,
                    jump_to_latest: jump,
                })
                .await;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "snapshot load skipped");
            }
        }
    }

    async fn poll_console(&mut self) {
        if !self.session.is_running() {
            return;
        }
        match self.client.console_output().await {
            Ok(output) if output.ok => {
                self.emit(ControllerEvent::ConsoleOutput(output.lines)).await;
                if self.session.flags.pending_refresh {
                    self.session.flags.pending_refresh = false;
                    self.schedule(ControllerCommand::LoadSnapshots, session::OUTPUT_FLUSH_DELAY);
                }
            }
            Ok(_) => {}
            Err(err) => {
                // Transient poll failures are tolerated by the next tick.
                tracing::debug!(error = %err, "console poll skipped");
            }
        }
    }

    async fn toggle_console(&mut self) {
        if self.session.is_running() {
            self.stop_console().await;
        } else {
            self.start_console().await;
        }
    }

    async fn start_console(&mut self) -> bool {
        match self.client.console_start().await {
            Ok(ack) if ack.ok => {
                let guard = CancellationToken::new();
                self.session.set_running(guard.clone());
                self.spawn_poll_timer(guard);
                tracing::info!("console session started");
                self.emit(ControllerEvent::ConsoleRunning(true)).await;
                self.emit(ControllerEvent::ConsoleMessage(
                    "console started, waiting for input...".to_string(),
                ))
                .await;
                true
            }
            Ok(ack) => {
                self.emit(ControllerEvent::ConsoleMessage(format!(
                    "failed to start: {}",
                    ack.error.unwrap_or_default()
                )))
                .await;
                false
            }
            Err(err) => {
                self.emit(ControllerEvent::ConsoleMessage(format!("failed to start: {err}")))
                    .await;
                false
            }
        }
    }

    async fn stop_console(&mut self) {
        let result = self.client.console_stop().await;
        // The poll timer dies even when the stop request fails.
        self.session.set_stopped();
        self.emit(ControllerEvent::ConsoleRunning(false)).await;
        match result {
            Ok(ack) if ack.ok => {
                tracing::info!("console session stopped");
                self.emit(ControllerEvent::ConsoleMessage("console stopped".to_string()))
                    .await;
            }
            Ok(_) => {
                self.emit(ControllerEvent::ConsoleMessage("failed to stop".to_string()))
                    .await;
            }
            Err(err) => {
                self.emit(ControllerEvent::ConsoleMessage(format!("failed to stop: {err}")))
                    .await;
            }
        }
    }

    fn spawn_poll_timer(&self, guard: CancellationToken) {
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + session::POLL_INTERVAL;
            let mut ticker = tokio::time::interval_at(start, session::POLL_INTERVAL);
            loop {
                tokio::select! {
                    _ = guard.cancelled() => break,
                    _ = ticker.tick() => {
                        if commands.send(ControllerCommand::PollConsole).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    async fn ensure_running(&mut self) -> bool {
        if self.session.is_running() {
            return true;
        }
        self.start_console().await
    }

    async fn send_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if !self.ensure_running().await {
            return;
        }
        let query = commands::is_query_command(&text);
        let plan = session::plan_send(&text);
        let total = plan.total_lines();
        match plan {
            SendPlan::Single(normalized) => {
                let (ok, error) = match self.client.console_input(&ConsoleInput::text(normalized)).await
                {
                    Ok(ack) if ack.ok => (true, None),
                    Ok(ack) => (false, ack.error.or_else(|| Some("send rejected".to_string()))),
                    Err(err) => (false, Some(err.to_string())),
                };
                self.finish_send(ok, error, query).await;
            }
            SendPlan::Batched(batches) => {
                self.emit(ControllerEvent::SendStarted { total }).await;
                let send_id = Uuid::new_v4();
                tracing::info!(
                    send_id = %send_id,
                    total_lines = total,
                    batches = batches.len(),
                    "chunked console send started"
                );
                let client = Arc::clone(&self.client);
                let events = self.events.clone();
                let commands = self.commands.clone();
                // Runs in its own task so console polling keeps ticking while
                // the batches stream out.
                tokio::spawn(async move {
                    run_batched_send(client, batches, total, send_id, events, commands, query).await;
                });
            }
        }
    }

    async fn finish_send(&mut self, ok: bool, error: Option<String>, query: bool) {
        if ok {
            self.emit(ControllerEvent::ConsoleInputCleared).await;
        }
        self.emit(ControllerEvent::SendFinished { error }).await;
        if query {
            self.session.flags.mark_query();
            self.schedule(ControllerCommand::LoadSnapshots, session::SEND_FALLBACK_RELOAD);
        }
    }

    async fn set_window_size(&mut self, size: u32) {
        if !self.ensure_running().await {
            return;
        }
        let line = commands::window_size_command(size);
        let error = match self.client.console_input(&ConsoleInput::text(line)).await {
            Ok(ack) if ack.ok => None,
            Ok(ack) => ack.error.or_else(|| Some("send rejected".to_string())),
            Err(err) => Some(err.to_string()),
        };
        self.emit(ControllerEvent::SendFinished { error }).await;
    }

    async fn query_minute(&mut self, minute: u32) {
        if !self.ensure_running().await {
            return;
        }
        let line = commands::query_command(minute);
        let error = match self.client.console_input(&ConsoleInput::text(line)).await {
            Ok(ack) if ack.ok => None,
            Ok(ack) => ack.error.or_else(|| Some("send rejected".to_string())),
            Err(err) => Some(err.to_string()),
        };
        self.emit(ControllerEvent::SendFinished { error }).await;
        self.session.flags.mark_query();
        self.schedule(ControllerCommand::PollConsole, session::QUERY_POLL_DELAY);
        self.schedule(ControllerCommand::LoadSnapshots, session::QUERY_FALLBACK_RELOAD);
    }

    /// Local state clears regardless of backend state; `RESET` goes to the
    /// backend only while a session is running.
    async fn reset(&mut self) {
        self.emit(ControllerEvent::ResetView).await;
        if !self.session.is_running() {
            return;
        }
        match self
            .client
            .console_input(&ConsoleInput::text(RESET_COMMAND))
            .await
        {
            Ok(ack) if ack.ok => {
                self.emit(ControllerEvent::ConsoleMessage("reset sent".to_string()))
                    .await;
            }
            Ok(ack) => {
                self.emit(ControllerEvent::ConsoleMessage(format!(
                    "reset failed: {}",
                    ack.error.unwrap_or_default()
                )))
                .await;
            }
            Err(err) => {
                self.emit(ControllerEvent::ConsoleMessage(format!("reset failed: {err}")))
                    .await;
            }
        }
    }

    async fn download(&mut self) {
        match self.client.download_output(&self.download_path).await {
            Ok(()) => {
                self.emit(ControllerEvent::DownloadStatus(format!(
                    "saved output to {}",
                    self.download_path.display()
                )))
                .await;
            }
            Err(err) => {
                self.emit(ControllerEvent::DownloadStatus(format!("download failed: {err}")))
                    .await;
            }
        }
    }
}

async fn run_batched_send(
    client: Arc<ApiClient>,
    batches: Vec<Vec<String>>,
    total: usize,
    send_id: Uuid,
    events: mpsc::Sender<ControllerEvent>,
    commands: mpsc::Sender<ControllerCommand>,
    query: bool,
) {
    let mut sent = 0usize;
    for batch in batches {
        let len = batch.len();
        let error = match client.console_input(&ConsoleInput::lines(batch)).await {
            Ok(ack) if ack.ok => None,
            Ok(ack) => Some(ack.error.unwrap_or_else(|| "send rejected".to_string())),
            Err(err) => Some(err.to_string()),
        };
        if let Some(error) = error {
            // Abort; batches already delivered stay delivered.
            tracing::warn!(
                send_id = %send_id,
                sent = sent,
                total = total,
                error = %error,
                "chunked send aborted"
            );
            let _ = commands
                .send(ControllerCommand::SendCompleted {
                    ok: false,
                    error: Some(error),
                    query,
                })
                .await;
            return;
        }
        sent += len;
        let _ = events
            .send(ControllerEvent::SendProgress { sent, total })
            .await;
        tokio::time::sleep(session::BATCH_PAUSE).await;
    }
    tracing::info!(send_id = %send_id, total = total, "chunked send finished");
    let _ = commands
        .send(ControllerCommand::SendCompleted {
            ok: true,
            error: None,
            query,
        })
        .await;
}

/// Joins trimmed stdout and stderr into console display lines, skipping
/// whichever streams are empty.
fn mirror_std_streams(stdout: Option<&str>, stderr: Option<&str>) -> Vec<String> {
    let mut pieces = Vec::new();
    for stream in [stdout, stderr].into_iter().flatten() {
        let trimmed = stream.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }
    }
    let joined = pieces.join("\n");
    if joined.is_empty() {
        Vec::new()
    } else {
        joined.lines().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_both_streams_in_order() {
        let lines = mirror_std_streams(Some("out line\n"), Some("  err line  "));
        assert_eq!(lines, vec!["out line".to_string(), "err line".to_string()]);
    }

    #[test]
    fn skips_empty_streams() {
        assert!(mirror_std_streams(Some("  \n"), None).is_empty());
        assert_eq!(
            mirror_std_streams(None, Some("only stderr")),
            vec!["only stderr".to_string()]
        );
    }
}
