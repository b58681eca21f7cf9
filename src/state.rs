//! The last successful search, owned by the CLI so `detail` can refer back
//! to it. Discovery itself never reads or writes this.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{SearchParameters, VideoResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastSearch {
    pub params: SearchParameters,
    pub results: Vec<VideoResult>,
    pub searched_at: DateTime<Utc>,
}

impl LastSearch {
    /// Look up a result by 1-based rank or by video id.
    pub fn find(&self, key: &str) -> Option<&VideoResult> {
        if let Ok(rank) = key.parse::<usize>() {
            return rank.checked_sub(1).and_then(|i| self.results.get(i));
        }
        let id = crate::extract_video_id(key).unwrap_or_else(|| key.to_string());
        self.results.iter().find(|v| v.id == id)
    }
}

pub fn state_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("ytscout")
        .join("last-search.json")
}

/// Load the last search, if one was saved and is readable.
pub fn load(path: &Path) -> Option<LastSearch> {
    let data = std::fs::read_to_string(path).ok()?;
    let last: LastSearch = serde_json::from_str(&data).ok()?;
    debug!("Loaded last search from {}", path.display());
    Some(last)
}

pub fn save(path: &Path, last: &LastSearch) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(last)?;
    std::fs::write(path, data)?;
    debug!("Saved last search to {}", path.display());
    Ok(())
}
