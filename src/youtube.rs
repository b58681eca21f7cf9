//! YouTube Data API v3: keyword search and batched video statistics.

use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::Deserialize;

use crate::VideoResult;
use crate::error::{Error, Result};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(default)]
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    channel_title: String,
    channel_id: String,
    published_at: DateTime<Utc>,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    // The API sends counts as strings
    view_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    #[serde(default)]
    duration: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl From<VideoItem> for VideoResult {
    fn from(item: VideoItem) -> Self {
        let thumbnail_url = item
            .snippet
            .thumbnails
            .medium
            .or(item.snippet.thumbnails.default)
            .map(|t| t.url)
            .unwrap_or_default();

        VideoResult {
            id: item.id,
            title: item.snippet.title,
            thumbnail_url,
            channel_title: item.snippet.channel_title,
            channel_id: item.snippet.channel_id,
            published_at: item.snippet.published_at,
            view_count: item
                .statistics
                .view_count
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            duration: item.content_details.duration,
        }
    }
}

/// Parameters of the search stage.
#[derive(Debug, Clone)]
pub struct SearchQuery<'a> {
    pub keyword: &'a str,
    pub published_after: DateTime<Utc>,
    pub published_before: DateTime<Utc>,
    pub max_results: u32,
    pub relevance_language: Option<&'static str>,
    pub video_duration: Option<&'static str>,
}

impl SearchQuery<'_> {
    /// Query string pairs, minus the API key.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("part", "snippet".to_string()),
            ("q", self.keyword.to_string()),
            ("type", "video".to_string()),
            ("order", "viewCount".to_string()),
            ("publishedAfter", rfc3339(&self.published_after)),
            ("publishedBefore", rfc3339(&self.published_before)),
            ("maxResults", self.max_results.to_string()),
        ];
        if let Some(lang) = self.relevance_language {
            pairs.push(("relevanceLanguage", lang.to_string()));
        }
        if let Some(duration) = self.video_duration {
            pairs.push(("videoDuration", duration.to_string()));
        }
        pairs
    }
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Client for the two Data API endpoints discovery needs
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_API_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search stage: candidate video ids in the provider's view-count order.
    pub async fn search_ids(&self, query: &SearchQuery<'_>) -> Result<Vec<String>> {
        debug!("YouTube search: q={:?} after={}", query.keyword, query.published_after);

        let mut pairs = query.to_pairs();
        pairs.push(("key", self.api_key.clone()));

        let resp: SearchResponse = self.get_json("search", &pairs).await?;
        let ids: Vec<String> = resp.items.into_iter().filter_map(|item| item.id.video_id).collect();

        debug!("YouTube search returned {} candidates", ids.len());
        Ok(ids)
    }

    /// Statistics stage: snippet, statistics and content details for a batch of ids.
    pub async fn videos(&self, ids: &[String]) -> Result<Vec<VideoResult>> {
        let pairs = [
            ("part", "statistics,snippet,contentDetails".to_string()),
            ("id", ids.join(",")),
            ("key", self.api_key.clone()),
        ];

        let resp: VideosResponse = self.get_json("videos", &pairs).await?;
        Ok(resp.items.into_iter().map(VideoResult::from).collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str, pairs: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        // reqwest errors carry the request URL, key included
        let resp = self
            .client
            .get(&url)
            .query(pairs)
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("{endpoint} request failed: {}", e.without_url())))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::Upstream(format!("{endpoint} returned {status}: {detail}")));
        }

        resp.json()
            .await
            .map_err(|e| Error::Upstream(format!("{endpoint} response could not be decoded: {}", e.without_url())))
    }
}
