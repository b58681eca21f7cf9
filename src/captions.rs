//! Caption track fetch from YouTube's timedtext endpoint. This backs the
//! server's `/get-transcript` route.

use eyre::{Result, bail};
use log::debug;

use crate::{Transcript, TranscriptSegment};

pub const DEFAULT_TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Fetch the caption track for `video_id` in `lang`.
///
/// Any failure to produce segments is reported as an unavailable transcript.
pub async fn fetch_transcript(client: &reqwest::Client, timedtext_url: &str, video_id: &str, lang: &str) -> Transcript {
    match fetch_segments(client, timedtext_url, video_id, lang).await {
        Ok(segments) if segments.is_empty() => Transcript::unavailable(video_id, "No transcript content found"),
        Ok(segments) => Transcript {
            video_id: video_id.to_string(),
            available: true,
            segments,
            reason: None,
        },
        Err(e) => {
            debug!("Transcript fetch failed for {video_id}: {e}");
            Transcript::unavailable(video_id, "Transcript not available")
        }
    }
}

async fn fetch_segments(
    client: &reqwest::Client,
    timedtext_url: &str,
    video_id: &str,
    lang: &str,
) -> Result<Vec<TranscriptSegment>> {
    debug!("Fetching captions: video={video_id} lang={lang}");

    let caption_xml = client
        .get(timedtext_url)
        .header("User-Agent", USER_AGENT)
        .query(&[("lang", lang), ("v", video_id)])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    parse_caption_xml(&caption_xml)
}

fn parse_caption_xml(xml: &str) -> Result<Vec<TranscriptSegment>> {
    use quick_xml::Reader;
    use quick_xml::events::Event;

    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<(f64, f64)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"text" => {
                let mut start = None;
                let mut dur = None;
                for attr in e.attributes().flatten() {
                    let value = String::from_utf8_lossy(&attr.value).parse::<f64>().ok();
                    match attr.key.as_ref() {
                        b"start" => start = value,
                        b"dur" => dur = value,
                        _ => {}
                    }
                }
                // Cues without a duration last zero seconds
                current = start.map(|s| (s, dur.unwrap_or(0.0)));
            }
            Ok(Event::Text(ref e)) => {
                if let Some((start, duration)) = current.take() {
                    let raw_text = e.unescape().unwrap_or_default().to_string();
                    let text = html_escape::decode_html_entities(&raw_text).trim().to_string();
                    if !text.is_empty() {
                        segments.push(TranscriptSegment { text, start, duration });
                    }
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"text" => current = None,
            Ok(Event::Eof) => break,
            Err(e) => bail!("error parsing caption XML: {e}"),
            _ => {}
        }
    }

    Ok(segments)
}
