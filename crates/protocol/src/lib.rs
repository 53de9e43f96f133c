use serde::{Deserialize, Serialize};

pub mod commands;

/// Analysis mode requested through the run form. The backend keeps the
/// browser-era form values on the wire: `"1"` is a one-shot batch pass,
/// `"2"` a long-lived interactive session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkType {
    #[serde(rename = "1")]
    Batch,
    #[serde(rename = "2")]
    Interactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunConfig {
    pub input_file: String,
    pub output_file: String,
    pub topk: u32,
    pub time_range: u32,
    pub work_type: WorkType,
    pub normalize: bool,
}

impl RunConfig {
    /// The composite run action always saves the config in batch mode,
    /// whatever the form's mode field currently says.
    pub fn forced_batch(mut self) -> Self {
        self.work_type = WorkType::Batch;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotItem {
    pub word: String,
    pub count: u64,
}

/// One time-stamped ranked word list. Item order is the backend's ranking
/// and must be preserved end to end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    pub time: u64,
    pub items: Vec<SnapshotItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunOutcome {
    pub ok: bool,
    #[serde(default)]
    pub output_preview: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedConfig {
    pub input_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub ok: bool,
    #[serde(default)]
    pub config: Option<UploadedConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParsedOutput {
    pub ok: bool,
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleAck {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `/api/console/output` returns the complete current line buffer on every
/// call; the client replaces its view wholesale rather than merging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsoleOutput {
    pub ok: bool,
    #[serde(default)]
    pub lines: Vec<String>,
}

/// Body for `/api/console/input`: one raw text blob for small payloads, or
/// one batch of lines during a chunked send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ConsoleInput {
    Text { text: String },
    Lines { lines: Vec<String> },
}

impl ConsoleInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn lines(lines: Vec<String>) -> Self {
        Self::Lines { lines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_config_roundtrip() {
        let config = RunConfig {
            input_file: "input/danmaku.txt".to_string(),
            output_file: "output/output.txt".to_string(),
            topk: 10,
            time_range: 5,
            work_type: WorkType::Interactive,
            normalize: true,
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let decoded: RunConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, decoded);
    }

    #[test]
    fn work_type_uses_form_values() {
        assert_eq!(
            serde_json::to_string(&WorkType::Batch).expect("serialize"),
            "\"1\""
        );
        assert_eq!(
            serde_json::to_string(&WorkType::Interactive).expect("serialize"),
            "\"2\""
        );
    }

    #[test]
    fn run_outcome_defaults_optional_fields() {
        let outcome: RunOutcome = serde_json::from_str(r#"{"ok":true}"#).expect("deserialize");
        assert!(outcome.ok);
        assert!(outcome.output_preview.is_none());
        assert!(outcome.stdout.is_none());
        assert!(outcome.stderr.is_none());
    }

    #[test]
    fn parsed_output_tolerates_missing_snapshots() {
        let parsed: ParsedOutput = serde_json::from_str(r#"{"ok":false}"#).expect("deserialize");
        assert!(!parsed.ok);
        assert!(parsed.snapshots.is_empty());
    }

    #[test]
    fn console_input_shapes() {
        let text = ConsoleInput::text("hello");
        assert_eq!(
            serde_json::to_string(&text).expect("serialize"),
            r#"{"text":"hello"}"#
        );
        let lines = ConsoleInput::lines(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            serde_json::to_string(&lines).expect("serialize"),
            r#"{"lines":["a","b"]}"#
        );
    }

    #[test]
    fn snapshot_preserves_item_order() {
        let json = r#"{"ok":true,"snapshots":[{"time":3,"items":[
            {"word":"b","count":2},{"word":"a","count":9},{"word":"c","count":1}
        ]}]}"#;
        let parsed: ParsedOutput = serde_json::from_str(json).expect("deserialize");
        let words: Vec<&str> = parsed.snapshots[0]
            .items
            .iter()
            .map(|item| item.word.as_str())
            .collect();
        assert_eq!(words, vec!["b", "a", "c"]);
    }
}
