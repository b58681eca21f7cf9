//! Script-based guess at the language of a video title.
//!
//! This is a heuristic, not a language detector. It only looks at which
//! Unicode ranges the characters fall into and exists to back the optional
//! language post-filter in discovery. It plays no part in ranking.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    Korean,
    English,
    Unknown,
}

/// Requested result language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ko,
    Both,
}

impl Language {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "en" => Some(Language::En),
            "ko" => Some(Language::Ko),
            "both" => Some(Language::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ko => "ko",
            Language::Both => "both",
        }
    }

    /// Value for the provider's `relevanceLanguage` hint.
    pub fn relevance_hint(&self) -> Option<&'static str> {
        match self {
            Language::Both => None,
            other => Some(other.as_str()),
        }
    }

    /// Whether a title classified as `detected` passes this filter.
    pub fn admits(&self, detected: Detected) -> bool {
        match self {
            Language::Both => true,
            Language::En => detected == Detected::English,
            Language::Ko => detected == Detected::Korean,
        }
    }
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{3131}'..='\u{3163}' | '\u{AC00}'..='\u{D7A3}')
}

fn is_latin_or_punctuation(c: char) -> bool {
    c.is_ascii() || matches!(c, '\u{00A0}'..='\u{024F}' | '\u{2000}'..='\u{206F}')
}

/// Classify `text`. Any Hangul wins, so mixed-script titles count as Korean.
pub fn classify(text: &str) -> Detected {
    if text.chars().any(is_hangul) {
        Detected::Korean
    } else if text.chars().all(is_latin_or_punctuation) {
        Detected::English
    } else {
        Detected::Unknown
    }
}
