use thiserror::Error;

/// Failures surfaced by discovery and enrichment.
///
/// An empty search is not an error: discovery returns an empty list for it.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid {field} parameter: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("search failed: {0}")]
    Upstream(String),

    #[error("enrichment unavailable: {0}")]
    EnrichmentUnavailable(String),
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
