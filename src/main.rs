use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use eyre::{Result, bail};
use log::{debug, info, warn};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};

use ytscout::config::{self, Config};
use ytscout::discovery::DiscoveryPipeline;
use ytscout::enrich::EnrichmentFetcher;
use ytscout::session::SearchSession;
use ytscout::state::{self, LastSearch};
use ytscout::youtube::YouTubeClient;
use ytscout::{SearchParameters, VideoResult, guard, output, server};

mod cli;

use cli::{Cli, Command, ResultsFormat, TranscriptFormat};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytscout.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytscout")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if config::api_key().is_ok() {
        format!("  \x1b[32m✅\x1b[0m {}", config::API_KEY_VAR)
    } else {
        format!("  \x1b[31m❌\x1b[0m {}  (not set: needed for search and serve)", config::API_KEY_VAR)
    };

    format!(
        "\nREQUIRED ENVIRONMENT:\n{key_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        config::config_path().display(),
        log_dir().join("ytscout.log").display()
    )
}

/// Raw search parameters assembled from flags, then config, then built-in defaults.
struct SearchDefaults {
    window: String,
    language: String,
    duration: Option<String>,
}

impl SearchDefaults {
    fn new(config: &Config, window: Option<String>, language: Option<String>, duration: Option<String>) -> Self {
        Self {
            window: window
                .or_else(|| config.default_window.clone())
                .unwrap_or_else(|| "24h".to_string()),
            language: language
                .or_else(|| config.default_language.clone())
                .unwrap_or_else(|| "both".to_string()),
            duration: duration.or_else(|| config.default_duration.clone()),
        }
    }

    fn raw(&self, keyword: &str) -> Value {
        json!({
            "keyword": keyword,
            "timeRange": self.window,
            "language": self.language,
            "videoDuration": self.duration,
        })
    }
}

fn pipeline(config: &Config, client: &reqwest::Client) -> Result<DiscoveryPipeline> {
    let youtube = YouTubeClient::with_base_url(client.clone(), config::api_key()?, config.youtube_api_base());
    Ok(DiscoveryPipeline::new(youtube, config.duration_thresholds))
}

fn fetcher(config: &Config, client: &reqwest::Client) -> EnrichmentFetcher {
    EnrichmentFetcher::new(client.clone(), config.transcript_url(), config.summary_url())
}

fn report_results(params: &SearchParameters, results: Vec<VideoResult>, format: ResultsFormat) {
    let now = Utc::now();
    let rendered = match format {
        ResultsFormat::Text => output::render_results_text(params, &results, &now),
        ResultsFormat::Json => output::render_results_json(&results),
    };
    println!("{rendered}");

    let last = LastSearch {
        params: params.clone(),
        results,
        searched_at: now,
    };
    if let Err(e) = state::save(&state::state_path(), &last) {
        warn!("Could not save last search: {e}");
    }
}

async fn cmd_search(
    config: &Config,
    client: &reqwest::Client,
    keyword: Option<String>,
    defaults: SearchDefaults,
    format: ResultsFormat,
) -> Result<()> {
    let pipeline = pipeline(config, client)?;

    let Some(keyword) = keyword else {
        return stream_searches(pipeline, defaults, format).await;
    };

    let params = guard::validate(&defaults.raw(&keyword))?;
    let results = tokio::select! {
        res = pipeline.discover(&params) => res?,
        _ = tokio::signal::ctrl_c() => bail!("search cancelled"),
    };
    report_results(&params, results, format);
    Ok(())
}

/// One search per stdin line. A new line supersedes the search still in flight.
async fn stream_searches(pipeline: DiscoveryPipeline, defaults: SearchDefaults, format: ResultsFormat) -> Result<()> {
    let session = Arc::new(SearchSession::new());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut latest = None;

    while let Some(line) = lines.next_line().await? {
        let keyword = line.trim();
        if keyword.is_empty() {
            continue;
        }

        let params = match guard::validate(&defaults.raw(keyword)) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        let session = session.clone();
        let pipeline = pipeline.clone();
        latest = Some(tokio::spawn(async move {
            match session.run(pipeline.discover(&params)).await {
                Some(Ok(results)) => report_results(&params, results, format),
                Some(Err(e)) => eprintln!("Search failed: {e}"),
                None => debug!("Search for {:?} superseded", params.keyword),
            }
        }));
    }

    if let Some(handle) = latest {
        handle.await?;
    }
    Ok(())
}

fn resolve_video_id(input: &str) -> Result<String> {
    ytscout::extract_video_id(input).ok_or_else(|| eyre::eyre!("could not extract video ID from: {input}\n\nSupported formats:\n  https://www.youtube.com/watch?v=ID\n  https://youtu.be/ID\n  https://www.youtube.com/embed/ID\n  https://www.youtube.com/shorts/ID\n  <11-character video ID>"))
}

async fn cmd_detail(config: &Config, client: &reqwest::Client, key: &str, summary: bool, transcript: bool) -> Result<()> {
    let last = state::load(&state::state_path())
        .ok_or_else(|| eyre::eyre!("no previous search found; run `ytscout search <KEYWORD>` first"))?;
    let Some(video) = last.find(key) else {
        bail!(
            "{key} is not among the {} results for {:?}",
            last.results.len(),
            last.params.keyword
        );
    };

    println!("{}", output::render_video_detail(video, &Utc::now()));

    // Enrichment is additive: failures are reported, never fatal
    let fetcher = fetcher(config, client);
    if summary {
        match fetcher.fetch_summary(&video.id).await {
            Ok(payload) => println!("\n--- Summary ---\n{}", output::render_enrichment(&payload)),
            Err(e) => {
                warn!("Summary for {} failed: {e}", video.id);
                eprintln!("\nSummary unavailable: {e}");
            }
        }
    }
    if transcript {
        match fetcher.fetch_transcript(&video.id).await {
            Ok(t) => println!("\n--- Transcript ---\n{}", output::render_transcript_text(&t)),
            Err(e) => {
                warn!("Transcript for {} failed: {e}", video.id);
                eprintln!("\nTranscript unavailable: {e}");
            }
        }
    }
    Ok(())
}

async fn cmd_transcript(
    config: &Config,
    client: &reqwest::Client,
    input: &str,
    format: TranscriptFormat,
    output_path: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let video_id = resolve_video_id(input)?;
    let transcript = fetcher(config, client).fetch_transcript(&video_id).await?;

    if verbose {
        eprintln!(
            "Video: {video_id}\nAvailable: {}\nSegments: {}",
            transcript.available,
            transcript.segments.len()
        );
    }
    if !transcript.available {
        eprintln!(
            "{}",
            transcript.reason.as_deref().unwrap_or("Transcript not available")
        );
        return Ok(());
    }

    let rendered = match format {
        TranscriptFormat::Text => output::render_transcript_text(&transcript),
        TranscriptFormat::Json => output::render_transcript_json(&transcript),
        TranscriptFormat::Srt => output::render_transcript_srt(&transcript),
    };

    if let Some(ref path) = output_path {
        std::fs::write(path, &rendered)?;
        if verbose {
            eprintln!("Output written to: {}", path.display());
        }
    } else {
        println!("{rendered}");
    }
    Ok(())
}

async fn cmd_summary(config: &Config, client: &reqwest::Client, input: &str) -> Result<()> {
    let video_id = resolve_video_id(input)?;
    let payload = fetcher(config, client).fetch_summary(&video_id).await?;
    println!("{}", output::render_enrichment(&payload));
    Ok(())
}

async fn cmd_serve(config: &Config, client: &reqwest::Client, bind: Option<String>) -> Result<()> {
    let addr: SocketAddr = bind.as_deref().unwrap_or(config.bind()).parse()?;
    let state = server::AppState {
        pipeline: pipeline(config, client)?,
        client: client.clone(),
        timedtext_url: config.timedtext_url().to_string(),
    };
    eprintln!("Serving on http://{addr}");
    server::serve(addr, state).await
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_else(|e| {
        warn!("Ignoring config file: {e}");
        Config::default()
    });

    if cli.verbose {
        let config_path = config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    let client = config.http_client()?;

    match cli.command {
        Command::Search {
            keyword,
            window,
            language,
            duration,
            format,
        } => {
            let defaults = SearchDefaults::new(&config, window, language, duration);
            cmd_search(&config, &client, keyword, defaults, format).await
        }
        Command::Detail {
            video,
            summary,
            transcript,
        } => cmd_detail(&config, &client, &video, summary, transcript).await,
        Command::Transcript { video, format, output } => {
            cmd_transcript(&config, &client, &video, format, output, cli.verbose).await
        }
        Command::Summary { video } => cmd_summary(&config, &client, &video).await,
        Command::Serve { bind } => cmd_serve(&config, &client, bind).await,
    }
}
