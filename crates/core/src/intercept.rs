//! Caption URL interception for one page load.
//!
//! The host environment wraps the page's outgoing request primitives and
//! feeds every URL through here; the request itself is never altered or
//! blocked. This module only decides which URLs are worth reporting.

use std::collections::HashSet;

use crate::types::UrlSource;

/// Marker identifying the caption endpoint in a request URL.
pub const CAPTION_URL_MARKER: &str = "timedtext";

pub fn is_caption_url(url: &str) -> bool {
    url.contains(CAPTION_URL_MARKER)
}

/// A caption URL the interception layer decided to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedCaptionUrl {
    pub url: String,
    pub source: UrlSource,
}

/// Filters observed request URLs down to caption-endpoint URLs, reporting
/// each raw URL at most once per page load. One instance per page load; a
/// navigation gets a fresh instance and thus a fresh seen-set.
pub struct CaptionSniffer {
    source: UrlSource,
    seen: HashSet<String>,
}

impl CaptionSniffer {
    pub fn new(source: UrlSource) -> Self {
        Self {
            source,
            seen: HashSet::new(),
        }
    }

    /// Inspect one outgoing request URL. Returns the report for the first
    /// sighting of a caption URL, `None` otherwise. Never fails.
    pub fn observe(&mut self, raw_url: &str) -> Option<ObservedCaptionUrl> {
        if raw_url.is_empty() || !is_caption_url(raw_url) {
            return None;
        }
        if !self.seen.insert(raw_url.to_string()) {
            return None;
        }
        Some(ObservedCaptionUrl {
            url: raw_url.to_string(),
            source: self.source,
        })
    }
}

pub type CaptionUrlCallback = Box<dyn FnMut(ObservedCaptionUrl) + Send>;

/// Capability the host environment consumes: a stream of caption URLs
/// observed inside the page's execution context. The concrete cross-context
/// bridge lives with the host, not here.
pub trait PageObserver: Send {
    fn on_caption_url_observed(&mut self, callback: CaptionUrlCallback);
}

/// Pass-through tap the host's request hook drives. Wraps a [`CaptionSniffer`]
/// and forwards reports to the registered callback.
pub struct PageTap {
    sniffer: CaptionSniffer,
    callback: Option<CaptionUrlCallback>,
}

impl PageTap {
    pub fn new(source: UrlSource) -> Self {
        Self {
            sniffer: CaptionSniffer::new(source),
            callback: None,
        }
    }

    /// Called with the URL of every outgoing request. Observation only; the
    /// underlying request proceeds regardless of what happens here.
    pub fn request_started(&mut self, raw_url: &str) {
        if let Some(observed) = self.sniffer.observe(raw_url) {
            if let Some(callback) = self.callback.as_mut() {
                callback(observed);
            }
        }
    }
}

impl PageObserver for PageTap {
    fn on_caption_url_observed(&mut self, callback: CaptionUrlCallback) {
        self.callback = Some(callback);
    }
}
