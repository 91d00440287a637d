pub mod email_analyzer;
pub mod url_analyzer;

use crate::error::AnalysisError;
use crate::model::ScoreResult;

pub use email_analyzer::{EmailAnalyzer, EmailText};
pub use url_analyzer::{UrlAnalyzer, UrlFeatures};

/// A heuristic scorer for one kind of item.
///
/// `score` may fail; `analyze` never does. A fault is logged and replaced by
/// the analyzer's low-confidence fallback so a single bad item cannot abort
/// a whole report.
pub trait Analyzer<I: ?Sized>: Send + Sync {
    fn score(&self, input: &I) -> Result<ScoreResult, AnalysisError>;

    fn fallback(&self) -> ScoreResult;

    fn name(&self) -> &str;

    fn analyze(&self, input: &I) -> ScoreResult {
        match self.score(input) {
            Ok(result) => result,
            Err(e) => {
                log::warn!("{} failed, using fallback: {}", self.name(), e);
                self.fallback()
            }
        }
    }
}

/// Scores built from hand-assembled (unvalidated) configs may be NaN.
pub(crate) fn finite(value: f64, item: &'static str) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::NonFiniteScore { item })
    }
}
