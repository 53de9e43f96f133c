use std::time::Duration;

use tokio_util::sync::CancellationToken;

pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(700);
/// Delay between noticing backend output and reloading snapshots, so the
/// backend can finish flushing query results to the output artifact.
pub(crate) const OUTPUT_FLUSH_DELAY: Duration = Duration::from_millis(150);
/// Fallback reload after a query-shaped send, in case the poll-triggered
/// reload is missed.
pub(crate) const SEND_FALLBACK_RELOAD: Duration = Duration::from_millis(500);
pub(crate) const QUERY_POLL_DELAY: Duration = Duration::from_millis(200);
pub(crate) const QUERY_FALLBACK_RELOAD: Duration = Duration::from_millis(600);
pub(crate) const BATCH_PAUSE: Duration = Duration::from_millis(5);

pub(crate) const MAX_LINES_PER_REQUEST: usize = 500;
pub(crate) const MAX_TEXT_BYTES: usize = 100 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionPhase {
    Stopped,
    Running,
}

/// "A query was just issued; refresh and jump to the newest result once the
/// backend output shows up." Owned by the controller task only.
#[derive(Debug, Default)]
pub(crate) struct DeferredRefresh {
    pub(crate) pending_refresh: bool,
    pub(crate) go_latest: bool,
}

impl DeferredRefresh {
    pub(crate) fn mark_query(&mut self) {
        self.pending_refresh = true;
        self.go_latest = true;
    }
}

/// Client view of the backend-held console session. The backend owns session
/// identity; the client tracks only the phase and its poll timer.
pub(crate) struct SessionManager {
    phase: SessionPhase,
    poll_guard: Option<CancellationToken>,
    pub(crate) flags: DeferredRefresh,
}

impl SessionManager {
    pub(crate) fn new() -> Self {
        Self {
            phase: SessionPhase::Stopped,
            poll_guard: None,
            flags: DeferredRefresh::default(),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub(crate) fn set_running(&mut self, guard: CancellationToken) {
        if let Some(previous) = self.poll_guard.take() {
            previous.cancel();
        }
        self.phase = SessionPhase::Running;
        self.poll_guard = Some(guard);
    }

    /// Cancels the poll timer unconditionally; called even when the stop
    /// request fails so no orphaned timer keeps polling.
    pub(crate) fn set_stopped(&mut self) {
        self.phase = SessionPhase::Stopped;
        if let Some(guard) = self.poll_guard.take() {
            guard.cancel();
        }
    }
}

/// How a console payload goes over the wire: one `{text}` request, or
/// sequential `{lines}` batches when the payload is large.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SendPlan {
    Single(String),
    Batched(Vec<Vec<String>>),
}

impl SendPlan {
    pub(crate) fn total_lines(&self) -> usize {
        match self {
            SendPlan::Single(text) => text.split('\n').count(),
            SendPlan::Batched(batches) => batches.iter().map(Vec::len).sum(),
        }
    }
}

pub(crate) fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Large means more than 500 lines or more than 100 KB of text; either
/// condition alone triggers chunking into 500-line batches.
pub(crate) fn plan_send(text: &str) -> SendPlan {
    let normalized = normalize_newlines(text);
    let lines: Vec<&str> = normalized.split('\n').collect();
    if lines.len() <= MAX_LINES_PER_REQUEST && normalized.len() <= MAX_TEXT_BYTES {
        return SendPlan::Single(normalized);
    }
    let batches = lines
        .chunks(MAX_LINES_PER_REQUEST)
        .map(|chunk| chunk.iter().map(|line| line.to_string()).collect())
        .collect();
    SendPlan::Batched(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> String {
        (0..count)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn exactly_five_hundred_lines_is_one_request() {
        match plan_send(&lines(500)) {
            SendPlan::Single(text) => assert_eq!(text.split('\n').count(), 500),
            SendPlan::Batched(_) => panic!("500 lines must not chunk"),
        }
    }

    #[test]
    fn five_hundred_one_lines_chunks_into_500_and_1() {
        match plan_send(&lines(501)) {
            SendPlan::Batched(batches) => {
                assert_eq!(batches.len(), 2);
                assert_eq!(batches[0].len(), 500);
                assert_eq!(batches[1].len(), 1);
            }
            SendPlan::Single(_) => panic!("501 lines must chunk"),
        }
    }

    #[test]
    fn oversized_text_chunks_even_under_line_limit() {
        // 10 lines, each well over 10 KB.
        let big = vec!["x".repeat(11 * 1024); 10].join("\n");
        assert!(big.len() > MAX_TEXT_BYTES);
        match plan_send(&big) {
            SendPlan::Batched(batches) => {
                assert_eq!(batches.len(), 1);
                assert_eq!(batches[0].len(), 10);
            }
            SendPlan::Single(_) => panic!("oversized text must chunk"),
        }
    }

    #[test]
    fn many_short_lines_chunk_even_under_byte_limit() {
        let text = lines(750);
        assert!(text.len() < MAX_TEXT_BYTES);
        match plan_send(&text) {
            SendPlan::Batched(batches) => {
                assert_eq!(batches.len(), 2);
                assert_eq!(batches[0].len(), 500);
                assert_eq!(batches[1].len(), 250);
            }
            SendPlan::Single(_) => panic!("750 lines must chunk"),
        }
    }

    #[test]
    fn crlf_and_cr_normalize_to_lf() {
        assert_eq!(normalize_newlines("a\r\nb\rc\nd"), "a\nb\nc\nd");
        match plan_send("a\r\nb") {
            SendPlan::Single(text) => assert_eq!(text, "a\nb"),
            SendPlan::Batched(_) => panic!("two lines must not chunk"),
        }
    }

    #[test]
    fn total_lines_counts_both_plans() {
        assert_eq!(plan_send(&lines(3)).total_lines(), 3);
        assert_eq!(plan_send(&lines(501)).total_lines(), 501);
    }

    #[test]
    fn stop_cancels_poll_guard() {
        let mut session = SessionManager::new();
        let guard = CancellationToken::new();
        session.set_running(guard.clone());
        assert!(session.is_running());
        session.set_stopped();
        assert!(guard.is_cancelled());
        assert!(!session.is_running());
    }

    #[test]
    fn restart_cancels_previous_guard() {
        let mut session = SessionManager::new();
        let first = CancellationToken::new();
        session.set_running(first.clone());
        let second = CancellationToken::new();
        session.set_running(second.clone());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
    }

    #[test]
    fn mark_query_sets_both_flags() {
        let mut flags = DeferredRefresh::default();
        flags.mark_query();
        assert!(flags.pending_refresh);
        assert!(flags.go_latest);
    }
}
