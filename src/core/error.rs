//! Errors reported by a valuation run

use chrono::NaiveDate;
use thiserror::Error;

/// Run-level failures of a valuation.
///
/// Row-level problems in a price series (a single unparsable date or price)
/// never surface here; those rows are skipped while the series is parsed.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Contribution not found: {0}")]
    ContributionNotFound(u64),

    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Price source timed out: {0}")]
    SourceTimeout(String),

    #[error("Malformed price source response: {0}")]
    MalformedResponse(String),

    #[error("No NAV data between {start} and {end}")]
    NoDataInRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Ledger(#[from] anyhow::Error),
}

impl ValuationError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ValuationError::InvalidInput(message.into())
    }
}
