//! Transcript and summary enrichment for a single video.
//!
//! The enrichment service's response shape is loosely contracted, so all of
//! the shape handling lives in [`normalize_summary`] and
//! [`normalize_transcript`]. Nothing outside this module sees the raw JSON.

use log::{debug, warn};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::{EnrichmentPayload, RelatedLink, Transcript, TranscriptSegment};

pub const DEFAULT_TRANSCRIPT_URL: &str = "http://127.0.0.1:8787/get-transcript";
pub const DEFAULT_SUMMARY_URL: &str = "http://localhost:5678/webhook-test/summaryapp";

/// Client for the transcript and summary endpoints
#[derive(Debug, Clone)]
pub struct EnrichmentFetcher {
    client: reqwest::Client,
    transcript_url: String,
    summary_url: String,
}

impl EnrichmentFetcher {
    pub fn new(client: reqwest::Client, transcript_url: impl Into<String>, summary_url: impl Into<String>) -> Self {
        Self {
            client,
            transcript_url: transcript_url.into(),
            summary_url: summary_url.into(),
        }
    }

    /// Fetch the timed transcript. A video without one is `Ok` with `available == false`.
    pub async fn fetch_transcript(&self, video_id: &str) -> Result<Transcript> {
        let json = self.post(&self.transcript_url, video_id).await?;

        let segments = normalize_transcript(&json);
        let flagged_available = json.get("available").and_then(Value::as_bool).unwrap_or(true);

        if !flagged_available || segments.is_empty() {
            let reason = json
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("Transcript not available");
            debug!("No transcript for {video_id}: {reason}");
            return Ok(Transcript::unavailable(video_id, reason));
        }

        Ok(Transcript {
            video_id: video_id.to_string(),
            available: true,
            segments,
            reason: None,
        })
    }

    /// Fetch the generated summary and related links.
    pub async fn fetch_summary(&self, video_id: &str) -> Result<EnrichmentPayload> {
        let json = self.post(&self.summary_url, video_id).await?;
        Ok(normalize_summary(&json))
    }

    async fn post(&self, url: &str, video_id: &str) -> Result<Value> {
        debug!("POST {url} videoId={video_id}");

        let resp = self
            .client
            .post(url)
            .json(&serde_json::json!({ "videoId": video_id }))
            .send()
            .await
            .map_err(|e| Error::EnrichmentUnavailable(format!("{url}: {}", e.without_url())))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("Enrichment service returned {status}: {body}");
            return Err(Error::EnrichmentUnavailable(format!("{url} returned {status}")));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| Error::EnrichmentUnavailable(format!("{url}: {}", e.without_url())))?;

        // Some webhooks answer with plain text
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

/// Webhook responses are sometimes wrapped in a one-element array.
fn unwrap_envelope(json: &Value) -> &Value {
    match json.as_array().map(Vec::as_slice) {
        Some([single]) => single,
        _ => json,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("text").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn link_of(value: &Value) -> Option<RelatedLink> {
    let url = value.get("url").and_then(Value::as_str)?;
    let title = value.get("title").and_then(Value::as_str).unwrap_or_default();
    Some(RelatedLink {
        title: title.to_string(),
        url: url.to_string(),
    })
}

/// Coerce any observed summary shape into an [`EnrichmentPayload`].
///
/// Summary text: a bare string, `response` (string or `{text}`), `text`, or
/// `summary` (string or `{text}`). Related links: `output`, `relatedLinks` or
/// `links`, each either one `{title, url}` object or a list of them.
pub fn normalize_summary(json: &Value) -> EnrichmentPayload {
    let json = unwrap_envelope(json);

    let summary_text = if let Value::String(s) = json {
        s.clone()
    } else {
        ["response", "text", "summary"]
            .iter()
            .filter_map(|key| json.get(*key))
            .find_map(text_of)
            .unwrap_or_default()
    };

    let related_links: Vec<RelatedLink> = ["output", "relatedLinks", "links"]
        .iter()
        .find_map(|key| json.get(*key))
        .map(|links| match links {
            Value::Array(items) => items.iter().filter_map(link_of).collect(),
            single => link_of(single).into_iter().collect(),
        })
        .unwrap_or_default();

    EnrichmentPayload {
        summary_text,
        related_links,
    }
}

fn seconds(value: Option<&Value>) -> Option<f64> {
    let parsed: Option<f64> = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.filter(|s| s.is_finite() && *s >= 0.0)
}

/// Segments from `{transcript: [...]}` or a bare array, in source order.
pub fn normalize_transcript(json: &Value) -> Vec<TranscriptSegment> {
    let items = match json {
        Value::Array(items) => items,
        other => match other.get("transcript").and_then(Value::as_array) {
            Some(items) => items,
            None => return Vec::new(),
        },
    };

    items
        .iter()
        .filter_map(|item| {
            let text = item.get("text")?.as_str()?.trim().to_string();
            if text.is_empty() {
                return None;
            }
            let start = seconds(item.get("start"))?;
            let duration = seconds(item.get("duration").or_else(|| item.get("dur"))).unwrap_or(0.0);
            Some(TranscriptSegment { text, start, duration })
        })
        .collect()
}
