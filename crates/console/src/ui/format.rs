pub(crate) fn send_progress_line(sent: usize, total: usize) -> String {
    let percent = if total == 0 { 100 } else { sent * 100 / total };
    format!("sent {sent}/{total} ({percent}%)")
}

pub(crate) fn snapshot_info_line(index: usize, len: usize, minute: u64) -> String {
    format!("page {}/{} | query time T = {} min", index + 1, len, minute)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_rounds_down() {
        assert_eq!(send_progress_line(0, 1000), "sent 0/1000 (0%)");
        assert_eq!(send_progress_line(500, 1000), "sent 500/1000 (50%)");
        assert_eq!(send_progress_line(501, 1000), "sent 501/1000 (50%)");
        assert_eq!(send_progress_line(1000, 1000), "sent 1000/1000 (100%)");
    }

    #[test]
    fn info_line_is_one_based() {
        assert_eq!(snapshot_info_line(0, 4, 3), "page 1/4 | query time T = 3 min");
        assert_eq!(snapshot_info_line(3, 4, 12), "page 4/4 | query time T = 12 min");
    }
}
