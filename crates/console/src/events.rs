use protocol::{RunConfig, Snapshot};

/// Work requested of the controller task. UI key handlers enqueue these via
/// `try_send`; timer tasks and the chunked-send task enqueue them awaited.
pub(crate) enum ControllerCommand {
    SaveConfig(RunConfig),
    /// Save with `work_type` forced to batch, then run. Bound to the run
    /// action and to time-window changes.
    SaveAndRun(RunConfig),
    UploadInput(String),
    LoadSnapshots,
    PollConsole,
    ToggleConsole,
    SendConsoleText(String),
    SetWindowSize(u32),
    QueryMinute(u32),
    Reset,
    DownloadOutput,
    /// Posted by the chunked-send task when its loop ends, so deferred
    /// refresh flags stay owned by the controller.
    SendCompleted {
        ok: bool,
        error: Option<String>,
        query: bool,
    },
}

/// State changes pushed to the UI loop.
pub(crate) enum ControllerEvent {
    RunStatus(String),
    OutputPreview(String),
    UploadStatus(String),
    /// Server-resolved input path; replaces the form value and the display
    /// label set optimistically from the local file name.
    InputPathResolved(String),
    SnapshotsLoaded {
        snapshots: Vec<Snapshot>,
        jump_to_latest: bool,
    },
    ConsoleRunning(bool),
    /// Replace the console output area with a single status message.
    ConsoleMessage(String),
    /// Full line-buffer replacement from a poll tick.
    ConsoleOutput(Vec<String>),
    ConsoleInputCleared,
    SendStarted {
        total: usize,
    },
    SendProgress {
        sent: usize,
        total: usize,
    },
    SendFinished {
        error: Option<String>,
    },
    /// Clear local view state (input box, output area, snapshots).
    ResetView,
    DownloadStatus(String),
}
