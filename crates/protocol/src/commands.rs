//! Command lines understood by the backend's interactive session.
//!
//! The console channel is plain text; three command shapes carry semantic
//! meaning to the analyzer: `WINDOW_SIZE = <n>`, `[ACTION] QUERY K=<t>` and
//! `RESET`. Everything else is treated as input data.

use regex::Regex;
use std::sync::OnceLock;

pub const RESET_COMMAND: &str = "RESET";

pub fn window_size_command(size: u32) -> String {
    format!("WINDOW_SIZE = {size}")
}

pub fn query_command(minute: u32) -> String {
    format!("[ACTION] QUERY K={minute}")
}

/// Window size must be a positive integer number of minutes.
pub fn parse_window_size(input: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    let size = trimmed
        .parse::<u32>()
        .map_err(|_| format!("invalid window size: {trimmed}"))?;
    if size == 0 {
        return Err("window size must be positive".to_string());
    }
    Ok(size)
}

/// Query time is a non-negative integer minute; minute 0 is valid.
pub fn parse_query_minute(input: &str) -> Result<u32, String> {
    let trimmed = input.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| format!("invalid query minute: {trimmed}"))
}

/// Whether a payload contains a query command. Matching is case-insensitive
/// and tolerates arbitrary whitespace around the `=`; a query anywhere in a
/// multi-line payload counts.
pub fn is_query_command(text: &str) -> bool {
    query_pattern().is_match(text)
}

fn query_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\[ACTION\]\s+QUERY\s+K\s*=\s*\d+").expect("static pattern is valid")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_rejects_non_positive_and_non_numeric() {
        assert!(parse_window_size("0").is_err());
        assert!(parse_window_size("-5").is_err());
        assert!(parse_window_size("abc").is_err());
        assert!(parse_window_size("").is_err());
    }

    #[test]
    fn window_size_accepts_and_formats() {
        let size = parse_window_size("15").expect("valid");
        assert_eq!(window_size_command(size), "WINDOW_SIZE = 15");
        assert_eq!(parse_window_size(" 7 ").expect("trimmed"), 7);
    }

    #[test]
    fn query_minute_rejects_negative_and_non_numeric() {
        assert!(parse_query_minute("-1").is_err());
        assert!(parse_query_minute("x").is_err());
    }

    #[test]
    fn query_minute_accepts_zero_and_formats() {
        assert_eq!(query_command(parse_query_minute("0").expect("zero")), "[ACTION] QUERY K=0");
        assert_eq!(
            query_command(parse_query_minute("120").expect("valid")),
            "[ACTION] QUERY K=120"
        );
    }

    #[test]
    fn query_detection_is_case_and_whitespace_tolerant() {
        assert!(is_query_command("[ACTION] QUERY K=42"));
        assert!(is_query_command("[action] query k = 42"));
        assert!(is_query_command("[Action]  Query  K =42"));
        assert!(is_query_command("line one\n[ACTION] QUERY K=3\nline two"));
    }

    #[test]
    fn query_detection_ignores_other_input() {
        assert!(!is_query_command("QUERY K=42"));
        assert!(!is_query_command("[ACTION] QUERY K="));
        assert!(!is_query_command("[ACTION] QUERY"));
        assert!(!is_query_command("WINDOW_SIZE = 5"));
        assert!(!is_query_command("plain danmaku text"));
    }

    #[test]
    fn reset_command_is_bare() {
        assert_eq!(RESET_COMMAND, "RESET");
    }
}
