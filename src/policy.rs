//! Recency windows, result caps and duration-class limits.
//!
//! Every bound discovery applies comes from the tables in this module.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::duration::ParsedDuration;

/// Raw candidates requested from the search endpoint (the API's page maximum).
pub const MAX_CANDIDATES: u32 = 50;

/// Default upper bound, in whole minutes, for every duration class.
pub const DEFAULT_MAX_MINUTES: u64 = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecencyWindow {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "60d")]
    TwoMonths,
    #[serde(rename = "90d")]
    Quarter,
}

struct WindowPolicy {
    window: RecencyWindow,
    code: &'static str,
    label: &'static str,
    hours: i64,
    cap: usize,
}

static WINDOWS: [WindowPolicy; 5] = [
    WindowPolicy {
        window: RecencyWindow::Day,
        code: "24h",
        label: "last 24 hours",
        hours: 24,
        cap: 10,
    },
    WindowPolicy {
        window: RecencyWindow::Week,
        code: "7d",
        label: "last 7 days",
        hours: 7 * 24,
        cap: 30,
    },
    WindowPolicy {
        window: RecencyWindow::Month,
        code: "30d",
        label: "last 30 days",
        hours: 30 * 24,
        cap: 50,
    },
    WindowPolicy {
        window: RecencyWindow::TwoMonths,
        code: "60d",
        label: "last 60 days",
        hours: 60 * 24,
        cap: 75,
    },
    WindowPolicy {
        window: RecencyWindow::Quarter,
        code: "90d",
        label: "last 90 days",
        hours: 90 * 24,
        cap: 100,
    },
];

impl RecencyWindow {
    pub const ALL: [RecencyWindow; 5] = [
        RecencyWindow::Day,
        RecencyWindow::Week,
        RecencyWindow::Month,
        RecencyWindow::TwoMonths,
        RecencyWindow::Quarter,
    ];

    fn policy(&self) -> &'static WindowPolicy {
        // WINDOWS is ordered like the enum
        &WINDOWS[*self as usize]
    }

    pub fn parse(value: &str) -> Option<Self> {
        WINDOWS.iter().find(|p| p.code == value).map(|p| p.window)
    }

    pub fn as_str(&self) -> &'static str {
        self.policy().code
    }

    /// Human phrase for headers, e.g. "last 7 days".
    pub fn label(&self) -> &'static str {
        self.policy().label
    }

    /// How far back `publishedAfter` reaches from now.
    pub fn lookback(&self) -> Duration {
        Duration::hours(self.policy().hours)
    }

    /// Maximum number of ranked results surfaced for this window.
    pub fn result_cap(&self) -> usize {
        self.policy().cap
    }
}

/// Coarse length bucket for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Short,
    Medium,
    Long,
    Any,
}

impl DurationClass {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "short" => Some(DurationClass::Short),
            "medium" => Some(DurationClass::Medium),
            "long" => Some(DurationClass::Long),
            "any" => Some(DurationClass::Any),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationClass::Short => "short",
            DurationClass::Medium => "medium",
            DurationClass::Long => "long",
            DurationClass::Any => "any",
        }
    }

    /// Value for the provider's `videoDuration` hint; `Any` sends nothing.
    pub fn provider_hint(&self) -> Option<&'static str> {
        match self {
            DurationClass::Any => None,
            other => Some(other.as_str()),
        }
    }
}

/// Per-class exclusive upper bound in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DurationPolicy {
    pub short: u64,
    pub medium: u64,
    pub long: u64,
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            short: DEFAULT_MAX_MINUTES,
            medium: DEFAULT_MAX_MINUTES,
            long: DEFAULT_MAX_MINUTES,
        }
    }
}

impl DurationPolicy {
    pub fn max_minutes(&self, class: DurationClass) -> Option<u64> {
        match class {
            DurationClass::Short => Some(self.short),
            DurationClass::Medium => Some(self.medium),
            DurationClass::Long => Some(self.long),
            DurationClass::Any => None,
        }
    }

    /// A video passes when its rounded-up length is strictly under the class bound.
    pub fn admits(&self, class: Option<DurationClass>, duration: &ParsedDuration) -> bool {
        match class.and_then(|c| self.max_minutes(c)) {
            Some(max) => duration.total_minutes() < max,
            None => true,
        }
    }
}
