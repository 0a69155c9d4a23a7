//! Konspekt Core Library
//!
//! Captures a video page's caption-endpoint URLs, reconstructs a clean
//! time-aligned transcript from the timed-caption payload, and assembles the
//! prompt for AI-generated lesson notes.

pub mod error;
pub mod fetch;
pub mod format;
pub mod generate;
pub mod intercept;
pub mod prompt;
pub mod store;
pub mod summarize;
pub mod tracker;
pub mod transcript;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{Result, SummarizeError};
pub use fetch::CaptionFetcher;
pub use format::{format_timestamp, sanitize_filename};
pub use generate::{DEFAULT_MODEL, OpenAiGenerator, TextGenerator, extract_output_text};
pub use intercept::{CaptionSniffer, ObservedCaptionUrl, PageObserver, PageTap, is_caption_url};
pub use prompt::build_prompt;
pub use store::{DebugScope, MemoryStorage, SessionStorage, TabStore};
pub use summarize::{Coordinator, MIN_TRANSCRIPT_CHARS};
pub use tracker::{MAX_CAPTURED_URLS, candidate_urls, normalize_caption_url, push_captured_url};
pub use transcript::{extract_transcript, fix_mojibake, normalize_text};
pub use types::{
    CaptionEvent, CaptionPayload, CaptionSeg, CapturedCaptionUrl, DebugEntry, DebugLevel,
    OutputFormat, SummarizeRequest, SummarizeResponse, SummaryMeta, TabId, TabState, Transcript,
    TranscriptLine, UrlSource,
};
