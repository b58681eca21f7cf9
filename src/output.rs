use chrono::{DateTime, Utc};

use crate::duration::format_duration;
use crate::{EnrichmentPayload, SearchParameters, Transcript, VideoResult};

/// Compact view count: `1.2M`, `3.4K`, `999`
pub fn format_view_count(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        count.to_string()
    }
}

/// Age relative to `now`: `Just now`, `5h ago`, `3d ago`
pub fn format_time_ago(published_at: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let hours = (*now - *published_at).num_hours();
    if hours < 1 {
        "Just now".to_string()
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 { format!("{h}:{m:02}:{s:02}") } else { format!("{m}:{s:02}") }
}

fn format_srt_timestamp(seconds: f64) -> String {
    let millis = (seconds.max(0.0) * 1000.0).round() as u64;
    let (h, rem) = (millis / 3_600_000, millis % 3_600_000);
    let (m, rem) = (rem / 60_000, rem % 60_000);
    let (s, ms) = (rem / 1000, rem % 1000);
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Header plus one numbered line per video
pub fn render_results_text(params: &SearchParameters, results: &[VideoResult], now: &DateTime<Utc>) -> String {
    if results.is_empty() {
        return "No videos found for your search criteria. Try different keywords or adjust the filters.".to_string();
    }

    let shown = results.len().min(params.window.result_cap());
    let mut lines = vec![
        format!("Top {shown} Most Viewed Videos"),
        format!("Showing results for \"{}\" from the {}", params.keyword, params.window.label()),
        String::new(),
    ];

    for (rank, video) in results.iter().take(shown).enumerate() {
        lines.push(format!(
            "{:>3}. {}  [{}]",
            rank + 1,
            video.title,
            format_duration(&video.duration)
        ));
        lines.push(format!(
            "     {} · {} views · {} · {}",
            video.channel_title,
            format_view_count(video.view_count),
            format_time_ago(&video.published_at, now),
            crate::watch_url(&video.id)
        ));
    }

    lines.join("\n")
}

pub fn render_results_json(results: &[VideoResult]) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "[]".to_string())
}

/// Full detail for one video
pub fn render_video_detail(video: &VideoResult, now: &DateTime<Utc>) -> String {
    [
        video.title.clone(),
        format!("Channel:   {} ({})", video.channel_title, video.channel_id),
        format!("Views:     {}", format_view_count(video.view_count)),
        format!("Published: {}", format_time_ago(&video.published_at, now)),
        format!("Duration:  {}", format_duration(&video.duration)),
        format!("Watch:     {}", crate::watch_url(&video.id)),
    ]
    .join("\n")
}

/// Render transcript as text, one `[M:SS] line` per segment
pub fn render_transcript_text(transcript: &Transcript) -> String {
    if !transcript.available {
        return transcript
            .reason
            .clone()
            .unwrap_or_else(|| "Transcript not available".to_string());
    }
    transcript
        .segments
        .iter()
        .map(|s| format!("[{}] {}", format_timestamp(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_transcript_json(transcript: &Transcript) -> String {
    serde_json::to_string_pretty(transcript).unwrap_or_else(|_| "{}".to_string())
}

pub fn render_transcript_srt(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                i + 1,
                format_srt_timestamp(s.start),
                format_srt_timestamp(s.start + s.duration),
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_enrichment(payload: &EnrichmentPayload) -> String {
    let mut out = if payload.summary_text.is_empty() {
        "(no summary returned)".to_string()
    } else {
        payload.summary_text.clone()
    };
    if !payload.related_links.is_empty() {
        out.push_str("\n\nRelated:");
        for link in &payload.related_links {
            out.push_str(&format!("\n  - {} <{}>", link.title, link.url));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Language, RecencyWindow, RelatedLink, TranscriptSegment};

    fn sample_transcript() -> Transcript {
        Transcript {
            video_id: "test123".to_string(),
            available: true,
            segments: vec![
                TranscriptSegment {
                    text: "Hello world".to_string(),
                    start: 0.0,
                    duration: 1.5,
                },
                TranscriptSegment {
                    text: "This is a test".to_string(),
                    start: 61.5,
                    duration: 2.0,
                },
            ],
            reason: None,
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_view_count() {
        assert_eq!(format_view_count(999), "999");
        assert_eq!(format_view_count(1_500), "1.5K");
        assert_eq!(format_view_count(2_340_000), "2.3M");
    }

    #[test]
    fn test_format_time_ago() {
        let now = ts("2024-05-10T12:00:00Z");
        assert_eq!(format_time_ago(&ts("2024-05-10T11:30:00Z"), &now), "Just now");
        assert_eq!(format_time_ago(&ts("2024-05-10T07:00:00Z"), &now), "5h ago");
        assert_eq!(format_time_ago(&ts("2024-05-07T12:00:00Z"), &now), "3d ago");
    }

    #[test]
    fn test_render_transcript_text() {
        assert_eq!(
            render_transcript_text(&sample_transcript()),
            "[0:00] Hello world\n[1:01] This is a test"
        );
    }

    #[test]
    fn test_render_transcript_unavailable() {
        let t = Transcript::unavailable("x", "Transcript not available");
        assert_eq!(render_transcript_text(&t), "Transcript not available");
        assert_eq!(render_transcript_srt(&t), "");
    }

    #[test]
    fn test_render_transcript_srt() {
        let srt = render_transcript_srt(&sample_transcript());
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,500\nHello world\n"));
        assert!(srt.contains("2\n00:01:01,500 --> 00:01:03,500\nThis is a test\n"));
    }

    #[test]
    fn test_render_results_text() {
        let params = SearchParameters {
            keyword: "rust".to_string(),
            window: RecencyWindow::Day,
            language: Language::Both,
            duration: None,
        };
        let video = VideoResult {
            id: "dQw4w9WgXcQ".to_string(),
            title: "Rust tips".to_string(),
            thumbnail_url: String::new(),
            channel_title: "Chan".to_string(),
            channel_id: "UC".to_string(),
            published_at: ts("2024-05-10T10:00:00Z"),
            view_count: 12_000,
            duration: "PT5M9S".to_string(),
        };
        let out = render_results_text(&params, &[video], &ts("2024-05-10T12:00:00Z"));
        assert!(out.starts_with("Top 1 Most Viewed Videos\nShowing results for \"rust\" from the last 24 hours"));
        assert!(out.contains("  1. Rust tips  [5:09]"));
        assert!(out.contains("12.0K views · 2h ago"));
    }

    #[test]
    fn test_render_results_empty() {
        let params = SearchParameters {
            keyword: "rust".to_string(),
            window: RecencyWindow::Day,
            language: Language::Both,
            duration: None,
        };
        assert!(render_results_text(&params, &[], &Utc::now()).starts_with("No videos found"));
    }

    #[test]
    fn test_render_enrichment() {
        let payload = EnrichmentPayload {
            summary_text: "hello".to_string(),
            related_links: vec![RelatedLink {
                title: "a".to_string(),
                url: "u".to_string(),
            }],
        };
        assert_eq!(render_enrichment(&payload), "hello\n\nRelated:\n  - a <u>");
        assert_eq!(render_enrichment(&EnrichmentPayload::default()), "(no summary returned)");
    }
}
