//! Host coordinator: owns tab state, wires captures to the fetcher, and
//! drives the summarize flow end to end.

use std::sync::Arc;

use serde_json::json;

use crate::{
    error::{Result, SummarizeError},
    fetch::CaptionFetcher,
    generate::{DEFAULT_MODEL, TextGenerator},
    prompt::build_prompt,
    store::{DebugScope, TabStore, now_ms},
    tracker::{normalize_caption_url, push_captured_url},
    transcript::extract_transcript,
    types::{
        DebugEntry, DebugLevel, SummarizeRequest, SummarizeResponse, TabId, TabState, UrlSource,
    },
};

/// Transcripts shorter than this are considered empty after cleaning.
pub const MIN_TRANSCRIPT_CHARS: usize = 10;

pub struct Coordinator {
    store: Arc<TabStore>,
    fetcher: CaptionFetcher,
    generator: Arc<dyn TextGenerator>,
}

impl Coordinator {
    pub fn new(
        store: Arc<TabStore>,
        fetcher: CaptionFetcher,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            fetcher,
            generator,
        }
    }

    pub fn store(&self) -> &Arc<TabStore> {
        &self.store
    }

    /// Record a caption URL observed for a tab. Both capture paths funnel
    /// here; the per-tab lock makes the read-modify-write atomic per tab.
    pub async fn record_caption_url(
        &self,
        tab_id: TabId,
        raw_url: &str,
        source: Option<UrlSource>,
        title: Option<String>,
    ) {
        let normalized = normalize_caption_url(raw_url);

        let lock = self.store.tab_lock(tab_id).await;
        {
            let _guard = lock.lock().await;
            let mut state = self.store.get_state(tab_id).await.unwrap_or_default();
            push_captured_url(&mut state, &normalized, source, title, now_ms());
            self.store.set_state(tab_id, &state).await;
        }

        self.store
            .add_debug(
                DebugScope::Tab(tab_id),
                DebugLevel::Info,
                "Captured caption URL",
                Some(json!({ "url": normalized, "source": source })),
            )
            .await;
    }

    /// Merge the page's reported status into the tab state.
    pub async fn page_status(&self, tab_id: TabId, is_on_host_site: bool, has_video_element: bool) {
        let lock = self.store.tab_lock(tab_id).await;
        {
            let _guard = lock.lock().await;
            let mut state = self.store.get_state(tab_id).await.unwrap_or_default();
            state.is_on_host_site = is_on_host_site;
            state.has_video_element = has_video_element;
            state.updated_at_ms = now_ms();
            self.store.set_state(tab_id, &state).await;
        }

        self.store
            .add_debug(
                DebugScope::Tab(tab_id),
                DebugLevel::Info,
                "Page status",
                Some(json!({
                    "is_on_host_site": is_on_host_site,
                    "has_video_element": has_video_element,
                })),
            )
            .await;
    }

    pub async fn get_state(&self, tab_id: TabId) -> Option<TabState> {
        self.store.get_state(tab_id).await
    }

    /// Debug-panel backend: the tab's log entries plus its current state.
    pub async fn get_debug(&self, tab_id: Option<TabId>) -> (Vec<DebugEntry>, Option<TabState>) {
        let scope = match tab_id {
            Some(id) => DebugScope::Tab(id),
            None => DebugScope::Global,
        };
        let entries = self.store.get_debug(scope).await;
        let state = match tab_id {
            Some(id) => self.store.get_state(id).await,
            None => None,
        };
        (entries, state)
    }

    /// Host notification that a tab closed; everything it owned is dropped.
    pub async fn tab_closed(&self, tab_id: TabId) {
        self.store.remove_tab(tab_id).await;
    }

    /// Run the full summarize flow for a tab. Never panics or propagates:
    /// failures come back as a structured response with a curated message.
    pub async fn summarize(&self, request: &SummarizeRequest) -> SummarizeResponse {
        match self.run_summarize(request).await {
            Ok(response) => response,
            Err(err) => {
                self.store
                    .add_debug(
                        DebugScope::Tab(request.tab_id),
                        DebugLevel::Error,
                        "Summarize failed",
                        Some(json!({ "error": err.to_string() })),
                    )
                    .await;
                SummarizeResponse::failure(err.to_string())
            }
        }
    }

    async fn run_summarize(&self, request: &SummarizeRequest) -> Result<SummarizeResponse> {
        let tab_id = request.tab_id;
        let state = self.store.get_state(tab_id).await;

        self.store
            .add_debug(
                DebugScope::Tab(tab_id),
                DebugLevel::Info,
                "Summarize requested",
                Some(json!({
                    "has_state": state.is_some(),
                    "url_count": state.as_ref().map_or(0, |s| s.captions_urls.len()),
                })),
            )
            .await;

        let state = state.ok_or(SummarizeError::NoCandidates)?;
        if state.captions_url.is_none() && state.captions_urls.is_empty() {
            return Err(SummarizeError::NoCandidates);
        }

        let payload = self.fetcher.resolve_transcript_source(tab_id, &state).await?;
        let transcript = extract_transcript(&payload.events);

        let transcript_text = if request.include_timestamps {
            &transcript.timed_text
        } else {
            &transcript.plain_text
        };
        if transcript_text.chars().count() < MIN_TRANSCRIPT_CHARS {
            self.store
                .add_debug(
                    DebugScope::Tab(tab_id),
                    DebugLevel::Error,
                    "Transcript empty after cleaning",
                    None,
                )
                .await;
            return Err(SummarizeError::EmptyTranscript);
        }

        let prompt = build_prompt(
            state.title.as_deref(),
            transcript.duration_ms,
            transcript_text,
            &request.extra_context,
            request.output_format,
        );

        let model = request.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let summary = self.generator.generate(model, &prompt).await?;

        Ok(SummarizeResponse::success(
            summary,
            transcript.line_count,
            transcript.duration_ms,
        ))
    }
}
