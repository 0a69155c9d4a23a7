use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Host-assigned identifier of a browser tab.
pub type TabId = u32;

/// Which interception path observed a caption URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlSource {
    PageScript,
    NetworkObserver,
}

/// One caption-endpoint URL captured for a tab, with recency and hit metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedCaptionUrl {
    pub url: String,
    pub last_seen_ms: u64,
    pub hits: u32,
    pub source: UrlSource,
}

/// Per-tab state owned by the coordinator. Created lazily on the first event
/// for a tab and cleared when the tab closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabState {
    pub captions_url: Option<String>,
    pub captions_urls: Vec<CapturedCaptionUrl>,
    pub title: Option<String>,
    pub is_on_host_site: bool,
    pub has_video_element: bool,
    pub updated_at_ms: u64,
}

/// Raw timed-caption payload as served by the caption endpoint (json3).
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionPayload {
    #[serde(default)]
    pub events: Vec<CaptionEvent>,
}

/// One display event in the caption payload. Consumed read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionEvent {
    #[serde(rename = "tStartMs")]
    pub t_start_ms: Option<u64>,
    #[serde(rename = "dDurationMs", default)]
    pub d_duration_ms: u64,
    #[serde(default)]
    pub segs: Vec<CaptionSeg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionSeg {
    #[serde(default)]
    pub utf8: String,
}

/// A merged caption line before rendering. Text is raw accumulator content;
/// normalization happens at render time.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub start_ms: Option<u64>,
    pub text: String,
}

/// Reconstructed transcript, both timestamped and plain.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub timed_text: String,
    pub plain_text: String,
    pub line_count: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugLevel {
    Info,
    Warn,
    Error,
}

/// Diagnostic entry in the bounded per-tab debug ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugEntry {
    pub ts_ms: u64,
    pub level: DebugLevel,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Md,
    Html,
}

/// Summarization request from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizeRequest {
    pub tab_id: TabId,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default = "default_true")]
    pub include_timestamps: bool,
    #[serde(default)]
    pub extra_context: String,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMeta {
    pub line_count: usize,
    pub duration_ms: u64,
}

/// Structured result returned to the summarization caller. Failures carry a
/// curated message, never raw internals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SummaryMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summaries longer than this are truncated in the response payload.
pub const SUMMARY_PREVIEW_LIMIT: usize = 4000;

impl SummarizeResponse {
    pub fn success(summary: String, line_count: usize, duration_ms: u64) -> Self {
        let truncated = summary.chars().count() > SUMMARY_PREVIEW_LIMIT;
        let summary = if truncated {
            summary.chars().take(SUMMARY_PREVIEW_LIMIT).collect()
        } else {
            summary
        };
        Self {
            ok: true,
            summary: Some(summary),
            truncated,
            meta: Some(SummaryMeta {
                line_count,
                duration_ms,
            }),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            summary: None,
            truncated: false,
            meta: None,
            error: Some(error.into()),
        }
    }
}
