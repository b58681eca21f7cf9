pub mod captions;
pub mod config;
pub mod discovery;
pub mod duration;
pub mod enrich;
pub mod error;
pub mod guard;
pub mod language;
pub mod output;
pub mod policy;
pub mod server;
pub mod session;
pub mod state;
pub mod youtube;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};
pub use language::Language;
pub use policy::{DurationClass, RecencyWindow};

/// Validated search input. Build one with [`guard::validate`]; deserializing
/// goes through the same validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct SearchParameters {
    pub keyword: String,
    #[serde(rename = "timeRange")]
    pub window: RecencyWindow,
    pub language: Language,
    #[serde(rename = "videoDuration", default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationClass>,
}

impl TryFrom<serde_json::Value> for SearchParameters {
    type Error = Error;

    fn try_from(raw: serde_json::Value) -> Result<Self> {
        guard::validate(&raw)
    }
}

/// One video as surfaced by discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    pub id: String,
    pub title: String,
    #[serde(rename = "thumbnail")]
    pub thumbnail_url: String,
    pub channel_title: String,
    pub channel_id: String,
    pub published_at: DateTime<Utc>,
    pub view_count: u64,
    pub duration: String,
}

/// A single timed line of a transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub duration: f64,
}

/// Transcript lookup outcome. A missing transcript is `available: false`, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub available: bool,
    pub segments: Vec<TranscriptSegment>,
    pub reason: Option<String>,
}

impl Transcript {
    pub fn unavailable(video_id: &str, reason: impl Into<String>) -> Self {
        Self {
            video_id: video_id.to_string(),
            available: false,
            segments: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

/// Summary and related links for one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentPayload {
    pub summary_text: String,
    pub related_links: Vec<RelatedLink>,
}

static VIDEO_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Bare 11-character video ID
        r"^([a-zA-Z0-9_-]{11})$",
        r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid video id pattern"))
    .collect()
});

/// Extract video ID from various YouTube URL formats
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    VIDEO_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(input))
        .map(|caps| caps[1].to_string())
}

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}
