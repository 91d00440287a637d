use thiserror::Error;

/// Fault while scoring a single item (the email text or one URL).
///
/// Analyzers absorb these into a low-confidence default result; they never
/// reach the caller of [`crate::PhishingDetector`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("score for {item} is not a finite number")]
    NonFiniteScore { item: &'static str },
}

/// Failure surfaced to the caller; no partial report accompanies it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorError {
    #[error("body text or HTML is required")]
    MissingBody,

    #[error("URL is required")]
    MissingUrl,

    #[error("score combination failed: {0}")]
    Combination(String),
}
