//! Transcript reconstruction from timed caption events.
//!
//! Caption payloads arrive as a flat stream of display events: text fragments
//! with start offsets, interleaved with newline-only marker events that close
//! a line. Reconstruction merges fragments between markers, repairs
//! double-encoded UTF-8, normalizes the merged text, and renders both a
//! timestamped and a plain transcript.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    format::format_timestamp,
    types::{CaptionEvent, Transcript, TranscriptLine},
};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*__\s*\]").expect("placeholder pattern"));
static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([,.;:!?])").expect("punctuation pattern"));
static SPACE_BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([)\]])").expect("closing bracket pattern"));
static SPACE_AFTER_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([(\[])\s+").expect("opening bracket pattern"));
static TIMESTAMP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[^\]]+\]\s*").expect("timestamp prefix pattern"));

/// Repair text that was decoded as Latin-1 but actually carries UTF-8 bytes.
///
/// Double-encoded text always contains the UTF-8 lead characters U+00C2 or
/// U+00C3; anything without them is returned untouched. The repair
/// reinterprets each code unit's low byte and redecodes as UTF-8, falling back
/// to the input when the byte sequence is not valid UTF-8.
pub fn fix_mojibake(text: &str) -> String {
    if !text.chars().any(|c| c == '\u{C2}' || c == '\u{C3}') {
        return text.to_string();
    }
    let bytes: Vec<u8> = text.chars().map(|c| (c as u32 & 0xFF) as u8).collect();
    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// Clean a merged caption line: drop `[__]` placeholder tokens, collapse
/// whitespace, and fix spacing around punctuation and brackets.
pub fn normalize_text(text: &str) -> String {
    let out = PLACEHOLDER.replace_all(text, "");
    let out = out.split_whitespace().collect::<Vec<_>>().join(" ");
    let out = SPACE_BEFORE_PUNCT.replace_all(&out, "$1");
    let out = SPACE_BEFORE_CLOSE.replace_all(&out, "$1");
    let out = SPACE_AFTER_OPEN.replace_all(&out, "$1");
    out.into_owned()
}

fn flush_line(lines: &mut Vec<TranscriptLine>, text: &mut String, start: &mut Option<u64>) {
    if !text.trim().is_empty() {
        lines.push(TranscriptLine {
            start_ms: *start,
            text: std::mem::take(text),
        });
    } else {
        text.clear();
    }
    *start = None;
}

/// Reconstruct a transcript from an ordered caption event sequence.
///
/// Pure and deterministic; never fails. An empty event list yields an empty
/// transcript with zero duration.
pub fn extract_transcript(events: &[CaptionEvent]) -> Transcript {
    let mut duration_ms: u64 = 0;
    let mut lines: Vec<TranscriptLine> = Vec::new();
    let mut current_text = String::new();
    let mut current_start: Option<u64> = None;

    for event in events {
        if let Some(start) = event.t_start_ms {
            duration_ms = duration_ms.max(start + event.d_duration_ms);
        }

        if event.segs.is_empty() {
            continue;
        }
        let text: String = event.segs.iter().map(|seg| seg.utf8.as_str()).collect();
        if text.is_empty() {
            continue;
        }
        let text = fix_mojibake(&text);

        // A lone newline closes the current line.
        if text == "\n" {
            flush_line(&mut lines, &mut current_text, &mut current_start);
            continue;
        }

        if current_start.is_none() {
            current_start = event.t_start_ms;
        }
        current_text.push_str(&text);
    }
    flush_line(&mut lines, &mut current_text, &mut current_start);

    let mut timed_lines: Vec<String> = Vec::with_capacity(lines.len());
    for line in &lines {
        let clean = normalize_text(&line.text);
        if clean.is_empty() {
            continue;
        }
        timed_lines.push(match line.start_ms {
            Some(ms) => format!("[{}] {}", format_timestamp(ms), clean),
            None => clean,
        });
    }

    let plain_text = timed_lines
        .iter()
        .map(|line| TIMESTAMP_PREFIX.replace(line, "").into_owned())
        .collect::<Vec<_>>()
        .join(" ");

    Transcript {
        timed_text: timed_lines.join("\n"),
        plain_text,
        line_count: timed_lines.len(),
        duration_ms,
    }
}
