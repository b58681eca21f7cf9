//! Two-stage discovery: keyword search, then batched statistics, then local
//! filtering, ranking and truncation.

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::duration::ParsedDuration;
use crate::error::Result;
use crate::language;
use crate::policy::{DurationPolicy, MAX_CANDIDATES};
use crate::youtube::{SearchQuery, YouTubeClient};
use crate::{SearchParameters, VideoResult};

/// Stateless ranking engine over a [`YouTubeClient`].
#[derive(Debug, Clone)]
pub struct DiscoveryPipeline {
    youtube: YouTubeClient,
    durations: DurationPolicy,
}

impl DiscoveryPipeline {
    pub fn new(youtube: YouTubeClient, durations: DurationPolicy) -> Self {
        Self { youtube, durations }
    }

    /// Most-viewed videos for `params`, descending by views and capped by the window.
    pub async fn discover(&self, params: &SearchParameters) -> Result<Vec<VideoResult>> {
        self.discover_at(params, Utc::now()).await
    }

    /// [`discover`](Self::discover) with an explicit "now".
    pub async fn discover_at(&self, params: &SearchParameters, now: DateTime<Utc>) -> Result<Vec<VideoResult>> {
        let query = SearchQuery {
            keyword: &params.keyword,
            published_after: now - params.window.lookback(),
            published_before: now,
            max_results: MAX_CANDIDATES,
            relevance_language: params.language.relevance_hint(),
            video_duration: params.duration.and_then(|d| d.provider_hint()),
        };

        info!("Searching {:?} over the {}", params.keyword, params.window.label());
        let ids = self.youtube.search_ids(&query).await?;
        if ids.is_empty() {
            info!("No candidates for {:?}", params.keyword);
            return Ok(Vec::new());
        }

        let videos = self.youtube.videos(&ids).await?;
        let ranked = rank(videos, params, &self.durations);
        info!("Returning {} of {} candidates", ranked.len(), ids.len());
        Ok(ranked)
    }
}

/// Filter by language and duration, sort by views (stable), and truncate to the window cap.
pub fn rank(videos: Vec<VideoResult>, params: &SearchParameters, durations: &DurationPolicy) -> Vec<VideoResult> {
    let mut kept: Vec<VideoResult> = videos
        .into_iter()
        .filter(|v| {
            let lang_ok = params.language.admits(language::classify(&v.title));
            let duration_ok = durations.admits(params.duration, &ParsedDuration::parse(&v.duration));
            if !(lang_ok && duration_ok) {
                debug!("Dropping {} (language ok: {lang_ok}, duration ok: {duration_ok})", v.id);
            }
            lang_ok && duration_ok
        })
        .collect();

    kept.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    kept.truncate(params.window.result_cap());
    kept
}
