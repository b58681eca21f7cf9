use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResultsFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TranscriptFormat {
    Text,
    Json,
    Srt,
}

#[derive(Parser)]
#[command(
    name = "ytscout",
    about = "Most-viewed YouTube videos for a keyword, with summaries and transcripts",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Show request details on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search for the most-viewed videos (reads keywords from stdin if omitted)
    Search {
        /// Search keyword
        keyword: Option<String>,

        /// Recency window: 24h, 7d, 30d, 60d, 90d
        #[arg(short, long)]
        window: Option<String>,

        /// Title language: en, ko, both
        #[arg(short, long)]
        language: Option<String>,

        /// Duration class: short, medium, long, any
        #[arg(short, long)]
        duration: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ResultsFormat::Text)]
        format: ResultsFormat,
    },

    /// Show a video from the last search by rank or id
    Detail {
        /// 1-based rank, video ID or URL
        video: String,

        /// Also fetch the generated summary
        #[arg(short, long)]
        summary: bool,

        /// Also fetch the transcript
        #[arg(short, long)]
        transcript: bool,
    },

    /// Fetch the timed transcript of a video
    Transcript {
        /// YouTube video URL or video ID
        video: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = TranscriptFormat::Text)]
        format: TranscriptFormat,

        /// Write output to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the generated summary and related links of a video
    Summary {
        /// YouTube video URL or video ID
        video: String,
    },

    /// Run the search proxy and transcript endpoints
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,
    },
}
