//! Validation of externally supplied search parameters.
//!
//! Every entry point funnels raw input through [`validate`] before anything
//! reaches the search provider's query string.

use log::debug;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::{DurationClass, Language, RecencyWindow, SearchParameters};

/// Keywords longer than this are truncated, not rejected.
pub const MAX_KEYWORD_CHARS: usize = 100;

fn field<'a>(raw: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .find_map(|name| raw.get(*name).filter(|v| !v.is_null()))
}

fn enum_field<T>(
    raw: &Value,
    names: &[&str],
    label: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    match field(raw, names) {
        None => Ok(None),
        Some(Value::String(s)) => parse(s.as_str())
            .map(Some)
            .ok_or_else(|| Error::invalid(label, format!("unrecognized value {s:?}"))),
        Some(other) => Err(Error::invalid(label, format!("expected a string, got {other}"))),
    }
}

/// Sanitize a keyword: trim, then cap its length.
pub fn sanitize_keyword(keyword: &str) -> String {
    keyword.trim().chars().take(MAX_KEYWORD_CHARS).collect()
}

/// Turn raw JSON search parameters into validated [`SearchParameters`].
///
/// Accepts `timeRange`/`recencyWindow` and `videoDuration`/`durationClass`
/// as field names.
pub fn validate(raw: &Value) -> Result<SearchParameters> {
    if !raw.is_object() {
        return Err(Error::invalid("searchParams", "expected a JSON object"));
    }

    let keyword = match field(raw, &["keyword"]) {
        Some(Value::String(s)) => sanitize_keyword(s),
        Some(_) => return Err(Error::invalid("keyword", "expected a string")),
        None => return Err(Error::invalid("keyword", "missing")),
    };
    if keyword.is_empty() {
        return Err(Error::invalid("keyword", "cannot be empty"));
    }

    let window = enum_field(raw, &["timeRange", "recencyWindow"], "timeRange", RecencyWindow::parse)?
        .ok_or_else(|| Error::invalid("timeRange", "missing"))?;
    let language = enum_field(raw, &["language"], "language", Language::parse)?
        .ok_or_else(|| Error::invalid("language", "missing"))?;
    let duration = enum_field(
        raw,
        &["videoDuration", "durationClass"],
        "videoDuration",
        DurationClass::parse,
    )?;

    debug!(
        "Validated search: keyword={keyword:?} window={} language={} duration={:?}",
        window.as_str(),
        language.as_str(),
        duration.map(|d| d.as_str())
    );

    Ok(SearchParameters {
        keyword,
        window,
        language,
        duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_of(err: Error) -> &'static str {
        match err {
            Error::InvalidParameter { field, .. } => field,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_params() {
        let params = validate(&json!({
            "keyword": "  rust async  ",
            "timeRange": "7d",
            "language": "en",
            "videoDuration": "short"
        }))
        .unwrap();
        assert_eq!(params.keyword, "rust async");
        assert_eq!(params.window, RecencyWindow::Week);
        assert_eq!(params.language, Language::En);
        assert_eq!(params.duration, Some(DurationClass::Short));
    }

    #[test]
    fn test_aliases_and_null_duration() {
        let params = validate(&json!({
            "keyword": "k",
            "recencyWindow": "90d",
            "language": "both",
            "durationClass": null
        }))
        .unwrap();
        assert_eq!(params.window, RecencyWindow::Quarter);
        assert_eq!(params.duration, None);
    }

    #[test]
    fn test_null_field_falls_through_to_alias() {
        let params = validate(&json!({
            "keyword": "k",
            "timeRange": null,
            "recencyWindow": "7d",
            "language": "en",
            "videoDuration": null,
            "durationClass": "long"
        }))
        .unwrap();
        assert_eq!(params.window, RecencyWindow::Week);
        assert_eq!(params.duration, Some(DurationClass::Long));
    }

    #[test]
    fn test_rejects_empty_keyword() {
        let err = validate(&json!({"keyword": "", "timeRange": "24h", "language": "en"})).unwrap_err();
        assert_eq!(field_of(err), "keyword");
    }

    #[test]
    fn test_rejects_whitespace_keyword() {
        let err = validate(&json!({"keyword": " \t\n ", "timeRange": "24h", "language": "en"})).unwrap_err();
        assert_eq!(field_of(err), "keyword");
    }

    #[test]
    fn test_rejects_missing_or_non_string_keyword() {
        let err = validate(&json!({"timeRange": "24h", "language": "en"})).unwrap_err();
        assert_eq!(field_of(err), "keyword");
        let err = validate(&json!({"keyword": 42, "timeRange": "24h", "language": "en"})).unwrap_err();
        assert_eq!(field_of(err), "keyword");
    }

    #[test]
    fn test_rejects_unknown_window() {
        let err = validate(&json!({"keyword": "k", "timeRange": "9d", "language": "en"})).unwrap_err();
        assert_eq!(field_of(err), "timeRange");
    }

    #[test]
    fn test_rejects_unknown_language() {
        let err = validate(&json!({"keyword": "k", "timeRange": "24h", "language": "fr"})).unwrap_err();
        assert_eq!(field_of(err), "language");
    }

    #[test]
    fn test_rejects_unknown_duration() {
        let err = validate(&json!({
            "keyword": "k",
            "timeRange": "24h",
            "language": "en",
            "videoDuration": "epic"
        }))
        .unwrap_err();
        assert_eq!(field_of(err), "videoDuration");
    }

    #[test]
    fn test_rejects_non_object() {
        let err = validate(&json!("rust")).unwrap_err();
        assert_eq!(field_of(err), "searchParams");
    }

    #[test]
    fn test_truncates_long_keyword() {
        let long = "가".repeat(150);
        let params = validate(&json!({"keyword": long, "timeRange": "24h", "language": "ko"})).unwrap();
        assert_eq!(params.keyword.chars().count(), MAX_KEYWORD_CHARS);
    }
}
