use std::sync::LazyLock;

use regex::Regex;

static ILLEGAL_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("filename pattern"));

pub const DEFAULT_FILENAME_BASE: &str = "video-summary";

/// Format milliseconds as `mm:ss`, or `hh:mm:ss` once the hour mark is passed.
pub fn format_timestamp(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Turn a video title into a safe base filename for the generated notes.
pub fn sanitize_filename(name: &str) -> String {
    let base = ILLEGAL_FILENAME_CHARS.replace_all(name, "_");
    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");
    if base.is_empty() {
        DEFAULT_FILENAME_BASE.to_string()
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_under_an_hour() {
        assert_eq!(format_timestamp(0), "00:00");
        assert_eq!(format_timestamp(65_000), "01:05");
        assert_eq!(format_timestamp(599_999), "09:59");
    }

    #[test]
    fn timestamp_with_hours() {
        assert_eq!(format_timestamp(3_661_000), "01:01:01");
        assert_eq!(format_timestamp(36_000_000), "10:00:00");
    }

    #[test]
    fn filename_strips_illegal_characters() {
        assert_eq!(
            sanitize_filename(r#"Class 3: Vite/React <setup>"#),
            "Class 3_ Vite_React _setup_"
        );
    }

    #[test]
    fn filename_collapses_whitespace_and_falls_back() {
        assert_eq!(sanitize_filename("  a   b  "), "a b");
        assert_eq!(sanitize_filename(""), DEFAULT_FILENAME_BASE);
        assert_eq!(sanitize_filename("   "), DEFAULT_FILENAME_BASE);
    }
}
