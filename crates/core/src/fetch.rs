//! Caption payload fetching with ranked-candidate fallback.

use std::sync::Arc;

use serde_json::json;

use crate::{
    error::{Result, SummarizeError},
    store::{DebugScope, TabStore},
    tracker::candidate_urls,
    types::{CaptionPayload, DebugLevel, TabId, TabState},
};

/// Fetches caption payloads using the viewer's ambient session (cookie jar).
pub struct CaptionFetcher {
    client: reqwest::Client,
    store: Arc<TabStore>,
}

impl CaptionFetcher {
    pub fn new(store: Arc<TabStore>) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("failed to build HTTP client");
        Self { client, store }
    }

    /// Use a caller-configured client, e.g. one sharing the host's cookie jar.
    pub fn with_client(client: reqwest::Client, store: Arc<TabStore>) -> Self {
        Self { client, store }
    }

    /// Fetch and validate one candidate URL. Failures are logged to the debug
    /// ring and returned for the caller to fall through to the next candidate.
    pub async fn fetch_candidate(&self, scope: DebugScope, url: &str) -> Result<CaptionPayload> {
        self.store
            .add_debug(
                scope,
                DebugLevel::Info,
                "Fetching captions",
                Some(json!({ "url": url })),
            )
            .await;

        match self.fetch_and_validate(url).await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                self.store
                    .add_debug(
                        scope,
                        DebugLevel::Warn,
                        "Captions fetch failed",
                        Some(json!({ "url": url, "error": err.to_string() })),
                    )
                    .await;
                Err(err)
            }
        }
    }

    async fn fetch_and_validate(&self, url: &str) -> Result<CaptionPayload> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SummarizeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let payload: CaptionPayload = serde_json::from_str(&body)?;
        if payload.events.is_empty() {
            return Err(SummarizeError::EmptyEvents);
        }
        Ok(payload)
    }

    /// Try the tab's ranked candidates in order, stopping at the first
    /// payload that validates. Candidates are fetched sequentially; only the
    /// first success is needed.
    pub async fn resolve_transcript_source(
        &self,
        tab_id: TabId,
        state: &TabState,
    ) -> Result<CaptionPayload> {
        let candidates = candidate_urls(state);
        if candidates.is_empty() {
            return Err(SummarizeError::NoCandidates);
        }

        for url in &candidates {
            if let Ok(payload) = self.fetch_candidate(DebugScope::Tab(tab_id), url).await {
                return Ok(payload);
            }
        }
        Err(SummarizeError::NoValidCaptions)
    }
}
