use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("valid duration pattern")
});

/// Video length as reported by the Data API (`PT1H2M3S`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedDuration {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ParsedDuration {
    /// Parse a compact ISO-8601 duration. Never fails: anything that does not
    /// match the grammar is the zero duration. Days are folded into hours.
    pub fn parse(input: &str) -> Self {
        let Some(caps) = DURATION_RE.captures(input.trim()) else {
            return Self::default();
        };

        let field = |i: usize| {
            caps.get(i)
                .and_then(|m| m.as_str().parse::<u64>().ok())
                .unwrap_or_default()
        };

        Self {
            hours: field(1).saturating_mul(24).saturating_add(field(2)),
            minutes: field(3),
            seconds: field(4),
        }
    }

    /// Whole minutes, counting any leftover seconds as one more minute.
    pub fn total_minutes(&self) -> u64 {
        let rounded = if self.seconds > 0 { 1 } else { 0 };
        self.hours
            .saturating_mul(60)
            .saturating_add(self.minutes)
            .saturating_add(rounded)
    }
}

impl fmt::Display for ParsedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hours > 0 {
            write!(f, "{}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
        } else {
            write!(f, "{}:{:02}", self.minutes, self.seconds)
        }
    }
}

/// Shorthand for rendering a raw API duration string.
pub fn format_duration(raw: &str) -> String {
    ParsedDuration::parse(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let d = ParsedDuration::parse("PT1H2M3S");
        assert_eq!(
            d,
            ParsedDuration {
                hours: 1,
                minutes: 2,
                seconds: 3
            }
        );
        assert_eq!(d.to_string(), "1:02:03");
    }

    #[test]
    fn test_display_without_hours() {
        assert_eq!(ParsedDuration::parse("PT5M9S").to_string(), "5:09");
        assert_eq!(ParsedDuration::parse("PT45S").to_string(), "0:45");
        assert_eq!(ParsedDuration::parse("PT2H").to_string(), "2:00:00");
    }

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(ParsedDuration::parse(""), ParsedDuration::default());
        assert_eq!(format_duration(""), "0:00");
    }

    #[test]
    fn test_malformed_is_zero() {
        for input in ["garbage", "1H2M", "PTXM", "P-1D", "PT5M9", "🙂"] {
            assert_eq!(ParsedDuration::parse(input), ParsedDuration::default(), "{input}");
        }
    }

    #[test]
    fn test_days_fold_into_hours() {
        let d = ParsedDuration::parse("P1DT2H3M");
        assert_eq!(d.hours, 26);
        assert_eq!(d.to_string(), "26:03:00");
    }

    #[test]
    fn test_total_minutes_rounds_up() {
        assert_eq!(ParsedDuration::parse("PT22M").total_minutes(), 22);
        assert_eq!(ParsedDuration::parse("PT22M1S").total_minutes(), 23);
        assert_eq!(ParsedDuration::parse("PT1H30M15S").total_minutes(), 91);
        assert_eq!(ParsedDuration::parse("PT45S").total_minutes(), 1);
        assert_eq!(ParsedDuration::parse("").total_minutes(), 0);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let d = ParsedDuration::parse("PT99999999999999999999H");
        assert_eq!(d, ParsedDuration::default());
        let d = ParsedDuration::parse("P18446744073709551615DT1H");
        assert_eq!(d.hours, u64::MAX);
        assert_eq!(d.total_minutes(), u64::MAX);
    }
}
