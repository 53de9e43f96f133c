use std::time::SystemTime;

use protocol::{RunConfig, Snapshot, WorkType};

use crate::config::FormDefaults;
use crate::events::ControllerEvent;
use crate::ui::format::send_progress_line;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Form,
    Console,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FormField {
    InputFile,
    OutputFile,
    TopK,
    TimeRange,
    WorkType,
    Normalize,
    UploadPath,
}

pub(crate) const FORM_FIELDS: [FormField; 7] = [
    FormField::InputFile,
    FormField::OutputFile,
    FormField::TopK,
    FormField::TimeRange,
    FormField::WorkType,
    FormField::Normalize,
    FormField::UploadPath,
];

impl FormField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            FormField::InputFile => "input file",
            FormField::OutputFile => "output file",
            FormField::TopK => "top k",
            FormField::TimeRange => "time window (min)",
            FormField::WorkType => "mode",
            FormField::Normalize => "normalize",
            FormField::UploadPath => "upload path",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PromptKind {
    Field(FormField),
    WindowSize,
    QueryMinute,
}

pub(crate) struct PromptState {
    pub(crate) kind: PromptKind,
    pub(crate) buffer: String,
    pub(crate) error: Option<String>,
}

pub(crate) struct FormState {
    pub(crate) input_file: String,
    pub(crate) output_file: String,
    pub(crate) topk: String,
    pub(crate) time_range: String,
    pub(crate) work_type: WorkType,
    pub(crate) normalize: bool,
    pub(crate) upload_path: String,
    /// Human-readable label for the resolved input; optimistically the local
    /// file name during an upload, corrected to the server path on success.
    pub(crate) input_display: String,
}

impl FormState {
    pub(crate) fn from_defaults(defaults: &FormDefaults) -> Self {
        Self {
            input_file: defaults.input_file.clone(),
            output_file: defaults.output_file.clone(),
            topk: defaults.topk.to_string(),
            time_range: defaults.time_range.to_string(),
            work_type: WorkType::Batch,
            normalize: defaults.normalize,
            upload_path: String::new(),
            input_display: defaults.input_file.clone(),
        }
    }

    /// The config is rebuilt from the live form on every save/run; numeric
    /// fields are validated here before any network call.
    pub(crate) fn build_run_config(&self) -> Result<RunConfig, String> {
        let topk = self
            .topk
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid top k: {}", self.topk))?;
        let time_range = self
            .time_range
            .trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid time window: {}", self.time_range))?;
        Ok(RunConfig {
            input_file: self.input_file.clone(),
            output_file: self.output_file.clone(),
            topk,
            time_range,
            work_type: self.work_type,
            normalize: self.normalize,
        })
    }

    pub(crate) fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::InputFile => self.input_file.clone(),
            FormField::OutputFile => self.output_file.clone(),
            FormField::TopK => self.topk.clone(),
            FormField::TimeRange => self.time_range.clone(),
            FormField::WorkType => match self.work_type {
                WorkType::Batch => "batch".to_string(),
                WorkType::Interactive => "interactive".to_string(),
            },
            FormField::Normalize => if self.normalize { "on" } else { "off" }.to_string(),
            FormField::UploadPath => self.upload_path.clone(),
        }
    }

    pub(crate) fn set_text_field(&mut self, field: FormField, value: String) {
        match field {
            FormField::InputFile => self.input_file = value,
            FormField::OutputFile => self.output_file = value,
            FormField::TopK => self.topk = value,
            FormField::TimeRange => self.time_range = value,
            FormField::UploadPath => self.upload_path = value,
            FormField::WorkType | FormField::Normalize => {}
        }
    }

    pub(crate) fn toggle_work_type(&mut self) {
        self.work_type = match self.work_type {
            WorkType::Batch => WorkType::Interactive,
            WorkType::Interactive => WorkType::Batch,
        };
    }

    pub(crate) fn toggle_normalize(&mut self) {
        self.normalize = !self.normalize;
    }
}

pub(crate) struct AppState {
    pub(crate) form: FormState,
    pub(crate) form_selected: usize,
    pub(crate) focus: Focus,
    pub(crate) prompt: Option<PromptState>,
    pub(crate) form_error: Option<String>,

    pub(crate) snapshots: Vec<Snapshot>,
    pub(crate) snap_idx: usize,
    pub(crate) chart_highlight: bool,

    pub(crate) console_lines: Vec<String>,
    pub(crate) console_input: String,
    pub(crate) console_running: bool,
    pub(crate) sending: bool,
    pub(crate) send_status: String,

    pub(crate) run_status: String,
    pub(crate) upload_status: String,
    pub(crate) download_status: String,
    pub(crate) output_preview: String,

    pub(crate) last_updated: Option<SystemTime>,
    pub(crate) confirm_quit: bool,
}

impl AppState {
    pub(crate) fn new(defaults: &FormDefaults) -> Self {
        Self {
            form: FormState::from_defaults(defaults),
            form_selected: 0,
            focus: Focus::Form,
            prompt: None,
            form_error: None,
            snapshots: Vec::new(),
            snap_idx: 0,
            chart_highlight: false,
            console_lines: Vec::new(),
            console_input: String::new(),
            console_running: false,
            sending: false,
            send_status: String::new(),
            run_status: String::new(),
            upload_status: String::new(),
            download_status: String::new(),
            output_preview: String::new(),
            last_updated: None,
            confirm_quit: false,
        }
    }

    pub(crate) fn handle_event(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::RunStatus(status) => self.run_status = status,
            ControllerEvent::OutputPreview(preview) => self.output_preview = preview,
            ControllerEvent::UploadStatus(status) => self.upload_status = status,
            ControllerEvent::InputPathResolved(path) => {
                self.form.input_file = path.clone();
                self.form.input_display = path;
            }
            ControllerEvent::SnapshotsLoaded {
                snapshots,
                jump_to_latest,
            } => {
                self.apply_snapshots(snapshots, jump_to_latest);
                self.last_updated = Some(SystemTime::now());
            }
            ControllerEvent::ConsoleRunning(running) => self.console_running = running,
            ControllerEvent::ConsoleMessage(message) => self.console_lines = vec![message],
            ControllerEvent::ConsoleOutput(lines) => self.console_lines = lines,
            ControllerEvent::ConsoleInputCleared => self.console_input.clear(),
            ControllerEvent::SendStarted { total } => {
                self.sending = true;
                self.send_status = send_progress_line(0, total);
            }
            ControllerEvent::SendProgress { sent, total } => {
                self.send_status = send_progress_line(sent, total);
            }
            ControllerEvent::SendFinished { error } => {
                self.sending = false;
                self.send_status = match error {
                    Some(error) => format!("send failed: {error}"),
                    None => String::new(),
                };
            }
            ControllerEvent::ResetView => self.reset_view(),
            ControllerEvent::DownloadStatus(status) => self.download_status = status,
        }
    }

    /// Cursor policy on a fresh sequence: jump to the newest snapshot when
    /// asked (highlighting the chart if the sequence actually grew and the
    /// tail has content), otherwise clamp the cursor so a shrinking sequence
    /// never leaves it out of range.
    pub(crate) fn apply_snapshots(&mut self, snapshots: Vec<Snapshot>, jump_to_latest: bool) {
        let previous_len = self.snapshots.len();
        self.snapshots = snapshots;
        if self.snapshots.is_empty() {
            self.snap_idx = 0;
            return;
        }
        if jump_to_latest {
            self.snap_idx = self.snapshots.len() - 1;
            let grew = self.snapshots.len() > previous_len;
            let tail_has_items = self
                .snapshots
                .last()
                .map(|snap| !snap.items.is_empty())
                .unwrap_or(false);
            if grew && tail_has_items {
                self.chart_highlight = true;
            }
        } else {
            self.snap_idx = self.snap_idx.min(self.snapshots.len() - 1);
        }
    }

    pub(crate) fn next_snapshot(&mut self) {
        if self.snapshots.is_empty() {
            return;
        }
        self.snap_idx = (self.snap_idx + 1) % self.snapshots.len();
        self.chart_highlight = false;
    }

    pub(crate) fn prev_snapshot(&mut self) {
        if self.snapshots.is_empty() {
            return;
        }
        let len = self.snapshots.len();
        self.snap_idx = (self.snap_idx + len - 1) % len;
        self.chart_highlight = false;
    }

    pub(crate) fn select_next_field(&mut self) {
        self.form_selected = (self.form_selected + 1) % FORM_FIELDS.len();
    }

    pub(crate) fn select_prev_field(&mut self) {
        self.form_selected = (self.form_selected + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    }

    pub(crate) fn selected_field(&self) -> FormField {
        FORM_FIELDS[self.form_selected.min(FORM_FIELDS.len() - 1)]
    }

    pub(crate) fn open_prompt(&mut self, kind: PromptKind) {
        let buffer = match kind {
            PromptKind::Field(field) => self.form.field_value(field),
            PromptKind::WindowSize | PromptKind::QueryMinute => String::new(),
        };
        self.prompt = Some(PromptState {
            kind,
            buffer,
            error: None,
        });
    }

    /// Clears local view state only; whether a RESET command also goes to the
    /// backend is the controller's call.
    pub(crate) fn reset_view(&mut self) {
        self.console_input.clear();
        self.console_lines.clear();
        self.send_status.clear();
        self.apply_snapshots(Vec::new(), false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::SnapshotItem;

    fn defaults() -> FormDefaults {
        FormDefaults::default()
    }

    fn snapshots(count: usize) -> Vec<Snapshot> {
        (0..count)
            .map(|i| Snapshot {
                time: i as u64 + 1,
                items: vec![SnapshotItem {
                    word: format!("word{i}"),
                    count: 3,
                }],
            })
            .collect()
    }

    #[test]
    fn next_cycles_back_to_origin() {
        let mut app = AppState::new(&defaults());
        for len in 1..=5usize {
            app.apply_snapshots(snapshots(len), false);
            for start in 0..len {
                app.snap_idx = start;
                for _ in 0..len {
                    app.next_snapshot();
                }
                assert_eq!(app.snap_idx, start, "next over {len} from {start}");
            }
        }
    }

    #[test]
    fn prev_cycles_back_to_origin() {
        let mut app = AppState::new(&defaults());
        for len in 1..=5usize {
            app.apply_snapshots(snapshots(len), false);
            for start in 0..len {
                app.snap_idx = start;
                for _ in 0..len {
                    app.prev_snapshot();
                }
                assert_eq!(app.snap_idx, start, "prev over {len} from {start}");
            }
        }
    }

    #[test]
    fn navigation_is_noop_when_empty() {
        let mut app = AppState::new(&defaults());
        app.next_snapshot();
        app.prev_snapshot();
        assert_eq!(app.snap_idx, 0);
    }

    #[test]
    fn empty_load_leaves_cursor_at_zero() {
        let mut app = AppState::new(&defaults());
        app.apply_snapshots(snapshots(3), false);
        app.snap_idx = 2;
        app.apply_snapshots(Vec::new(), false);
        assert_eq!(app.snap_idx, 0);
        assert!(app.snapshots.is_empty());
    }

    #[test]
    fn shrinking_sequence_clamps_cursor() {
        let mut app = AppState::new(&defaults());
        app.apply_snapshots(snapshots(5), false);
        app.snap_idx = 4;
        app.apply_snapshots(snapshots(2), false);
        assert_eq!(app.snap_idx, 1);
    }

    #[test]
    fn jump_to_latest_selects_tail_and_highlights_growth() {
        let mut app = AppState::new(&defaults());
        app.apply_snapshots(snapshots(2), false);
        app.apply_snapshots(snapshots(4), true);
        assert_eq!(app.snap_idx, 3);
        assert!(app.chart_highlight);
    }

    #[test]
    fn jump_without_growth_does_not_highlight() {
        let mut app = AppState::new(&defaults());
        app.apply_snapshots(snapshots(4), false);
        app.apply_snapshots(snapshots(4), true);
        assert_eq!(app.snap_idx, 3);
        assert!(!app.chart_highlight);
    }

    #[test]
    fn jump_onto_empty_tail_does_not_highlight() {
        let mut app = AppState::new(&defaults());
        app.apply_snapshots(snapshots(1), false);
        let mut grown = snapshots(3);
        grown[2].items.clear();
        app.apply_snapshots(grown, true);
        assert_eq!(app.snap_idx, 2);
        assert!(!app.chart_highlight);
    }

    #[test]
    fn reset_clears_view_regardless_of_session() {
        for running in [false, true] {
            let mut app = AppState::new(&defaults());
            app.console_running = running;
            app.apply_snapshots(snapshots(3), false);
            app.console_input = "pending".to_string();
            app.console_lines = vec!["old output".to_string()];
            app.reset_view();
            assert!(app.snapshots.is_empty());
            assert_eq!(app.snap_idx, 0);
            assert!(app.console_input.is_empty());
            assert!(app.console_lines.is_empty());
            assert_eq!(app.console_running, running);
        }
    }

    #[test]
    fn build_run_config_validates_numbers() {
        let mut form = FormState::from_defaults(&defaults());
        form.topk = "abc".to_string();
        assert!(form.build_run_config().is_err());
        form.topk = "12".to_string();
        form.time_range = "".to_string();
        assert!(form.build_run_config().is_err());
        form.time_range = "7".to_string();
        let config = form.build_run_config().expect("valid");
        assert_eq!(config.topk, 12);
        assert_eq!(config.time_range, 7);
    }

    #[test]
    fn resolved_path_overrides_optimistic_display() {
        let mut app = AppState::new(&defaults());
        app.form.input_display = "local.txt".to_string();
        app.handle_event(ControllerEvent::InputPathResolved(
            "input/upload_0001.txt".to_string(),
        ));
        assert_eq!(app.form.input_file, "input/upload_0001.txt");
        assert_eq!(app.form.input_display, "input/upload_0001.txt");
    }

    #[test]
    fn send_lifecycle_toggles_input_disable() {
        let mut app = AppState::new(&defaults());
        app.handle_event(ControllerEvent::SendStarted { total: 1000 });
        assert!(app.sending);
        app.handle_event(ControllerEvent::SendProgress {
            sent: 500,
            total: 1000,
        });
        assert_eq!(app.send_status, "sent 500/1000 (50%)");
        app.handle_event(ControllerEvent::SendFinished {
            error: Some("boom".to_string()),
        });
        assert!(!app.sending);
        assert_eq!(app.send_status, "send failed: boom");
    }

    #[test]
    fn console_message_replaces_buffer() {
        let mut app = AppState::new(&defaults());
        app.console_lines = vec!["a".to_string(), "b".to_string()];
        app.handle_event(ControllerEvent::ConsoleMessage("console stopped".to_string()));
        assert_eq!(app.console_lines, vec!["console stopped".to_string()]);
    }
}
