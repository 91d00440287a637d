pub mod detector;
pub mod domain_utils;
pub mod error;
pub mod features;
pub mod heuristic_config;
pub mod html_text;
pub mod model;
pub mod risk;

pub use detector::PhishingDetector;
pub use error::{AnalysisError, DetectorError};
pub use features::{Analyzer, EmailAnalyzer, UrlAnalyzer};
pub use heuristic_config::HeuristicConfig;
pub use model::{
    AnalysisInput, AnalysisReport, EmailAnalysis, Flag, FlagKind, LinkAnalysis, LinkInput,
    ScoreResult, UrlReport,
};
pub use risk::RiskLevel;
