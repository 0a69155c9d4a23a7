//! Captured caption URL normalization, deduplication, and ranking.

use url::Url;

use crate::types::{CapturedCaptionUrl, TabState, UrlSource};

/// Query parameter selecting the caption response format.
pub const CAPTION_FORMAT_PARAM: &str = "fmt";
/// Response format the transcript engine understands.
pub const CAPTION_FORMAT_JSON: &str = "json3";

/// Captured URLs kept per tab, most-recent-first.
pub const MAX_CAPTURED_URLS: usize = 12;

/// Canonicalize a captured caption URL, forcing the JSON response format when
/// no explicit format is present. Fail-open: unparseable input is returned
/// unchanged. Idempotent.
pub fn normalize_caption_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };
    let has_format = parsed
        .query_pairs()
        .any(|(key, _)| key == CAPTION_FORMAT_PARAM);
    if !has_format {
        parsed
            .query_pairs_mut()
            .append_pair(CAPTION_FORMAT_PARAM, CAPTION_FORMAT_JSON);
    }
    parsed.to_string()
}

/// Record a normalized URL in a tab's captured list: dedup by URL,
/// move-to-front, bump hits and recency, keep the prior source when none is
/// supplied, and truncate to [`MAX_CAPTURED_URLS`]. Also refreshes the tab's
/// most-recent URL and title.
pub fn push_captured_url(
    state: &mut TabState,
    normalized: &str,
    source: Option<UrlSource>,
    title: Option<String>,
    now_ms: u64,
) {
    let entry = match state
        .captions_urls
        .iter()
        .position(|item| item.url == normalized)
    {
        Some(idx) => {
            let prior = state.captions_urls.remove(idx);
            CapturedCaptionUrl {
                url: prior.url,
                last_seen_ms: now_ms,
                hits: prior.hits + 1,
                source: source.unwrap_or(prior.source),
            }
        }
        None => CapturedCaptionUrl {
            url: normalized.to_string(),
            last_seen_ms: now_ms,
            hits: 1,
            source: source.unwrap_or(UrlSource::NetworkObserver),
        },
    };
    state.captions_urls.insert(0, entry);
    state.captions_urls.truncate(MAX_CAPTURED_URLS);

    state.captions_url = Some(normalized.to_string());
    if title.is_some() {
        state.title = title;
    }
    state.updated_at_ms = now_ms;
}

/// Candidate URLs for a summarize attempt, most-recent-first, with the tab's
/// last known URL prepended when the list does not already carry it. Entries
/// sharing a timestamp keep their insertion order (stable sort).
pub fn candidate_urls(state: &TabState) -> Vec<String> {
    let mut ranked: Vec<&CapturedCaptionUrl> = state.captions_urls.iter().collect();
    ranked.sort_by(|a, b| b.last_seen_ms.cmp(&a.last_seen_ms));

    let mut candidates: Vec<String> = ranked.into_iter().map(|item| item.url.clone()).collect();
    if let Some(last) = &state.captions_url {
        if !candidates.contains(last) {
            candidates.insert(0, last.clone());
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL_A: &str = "https://video.example.com/api/timedtext?v=a&lang=en";
    const URL_B: &str = "https://video.example.com/api/timedtext?v=b&lang=en";

    #[test]
    fn normalize_adds_json_format_when_missing() {
        let normalized = normalize_caption_url("https://example.com/api/timedtext?v=1");
        assert!(normalized.contains("fmt=json3"));
    }

    #[test]
    fn normalize_keeps_existing_format() {
        let url = "https://example.com/api/timedtext?v=1&fmt=srv3";
        let normalized = normalize_caption_url(url);
        assert!(normalized.contains("fmt=srv3"));
        assert!(!normalized.contains("json3"));
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in [
            "https://example.com/api/timedtext?v=1",
            "https://example.com/api/timedtext?v=1&fmt=json3",
            "https://EXAMPLE.com/api/timedtext",
        ] {
            let once = normalize_caption_url(raw);
            assert_eq!(normalize_caption_url(&once), once);
        }
    }

    #[test]
    fn normalize_fails_open_on_unparseable_input() {
        assert_eq!(normalize_caption_url("not a url"), "not a url");
        assert_eq!(normalize_caption_url(""), "");
    }

    #[test]
    fn record_inserts_new_entry_at_front() {
        let mut state = TabState::default();
        push_captured_url(&mut state, URL_A, Some(UrlSource::PageScript), None, 100);
        push_captured_url(&mut state, URL_B, Some(UrlSource::PageScript), None, 200);

        assert_eq!(state.captions_urls.len(), 2);
        assert_eq!(state.captions_urls[0].url, URL_B);
        assert_eq!(state.captions_urls[0].hits, 1);
        assert_eq!(state.captions_url.as_deref(), Some(URL_B));
    }

    #[test]
    fn record_moves_repeat_to_front_and_bumps_hits() {
        let mut state = TabState::default();
        push_captured_url(&mut state, URL_A, Some(UrlSource::PageScript), None, 100);
        push_captured_url(&mut state, URL_B, Some(UrlSource::PageScript), None, 200);
        push_captured_url(&mut state, URL_A, None, None, 300);

        assert_eq!(state.captions_urls.len(), 2);
        assert_eq!(state.captions_urls[0].url, URL_A);
        assert_eq!(state.captions_urls[0].hits, 2);
        assert_eq!(state.captions_urls[0].last_seen_ms, 300);
        // No source supplied on the repeat, so the prior one sticks.
        assert_eq!(state.captions_urls[0].source, UrlSource::PageScript);

        push_captured_url(
            &mut state,
            URL_A,
            Some(UrlSource::NetworkObserver),
            None,
            400,
        );
        assert_eq!(state.captions_urls[0].hits, 3);
        assert_eq!(state.captions_urls[0].source, UrlSource::NetworkObserver);
    }

    #[test]
    fn record_caps_list_at_twelve() {
        let mut state = TabState::default();
        for i in 0..20 {
            let url = format!("https://example.com/api/timedtext?v={i}");
            push_captured_url(&mut state, &url, Some(UrlSource::PageScript), None, i);
        }
        assert_eq!(state.captions_urls.len(), MAX_CAPTURED_URLS);
        // Most recent survives, oldest fell off.
        assert_eq!(
            state.captions_urls[0].url,
            "https://example.com/api/timedtext?v=19"
        );
        assert!(
            !state
                .captions_urls
                .iter()
                .any(|item| item.url.ends_with("v=7"))
        );
    }

    #[test]
    fn record_keeps_existing_title_when_none_supplied() {
        let mut state = TabState::default();
        push_captured_url(
            &mut state,
            URL_A,
            Some(UrlSource::PageScript),
            Some("Lesson 1".into()),
            100,
        );
        push_captured_url(&mut state, URL_B, Some(UrlSource::NetworkObserver), None, 200);
        assert_eq!(state.title.as_deref(), Some("Lesson 1"));
    }

    #[test]
    fn candidates_ranked_by_recency_with_last_url_prepended() {
        let mut state = TabState::default();
        push_captured_url(&mut state, URL_A, Some(UrlSource::PageScript), None, 100);
        push_captured_url(&mut state, URL_B, Some(UrlSource::PageScript), None, 200);
        assert_eq!(candidate_urls(&state), vec![URL_B.to_string(), URL_A.to_string()]);

        // A last-known URL missing from the list goes first.
        state.captions_url = Some("https://example.com/api/timedtext?v=z".into());
        let candidates = candidate_urls(&state);
        assert_eq!(candidates[0], "https://example.com/api/timedtext?v=z");
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn candidates_with_equal_recency_keep_insertion_order() {
        let mut state = TabState::default();
        push_captured_url(&mut state, URL_A, Some(UrlSource::PageScript), None, 100);
        push_captured_url(&mut state, URL_B, Some(UrlSource::PageScript), None, 100);
        assert_eq!(candidate_urls(&state), vec![URL_B.to_string(), URL_A.to_string()]);
    }

    #[test]
    fn candidates_empty_for_fresh_state() {
        assert!(candidate_urls(&TabState::default()).is_empty());
    }
}
