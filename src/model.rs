use crate::features::UrlFeatures;
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One email as handed over by the caller. `body_html` is only read when
/// `body_text` is empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInput {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub body_html: String,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkInput {
    pub href: String,
    #[serde(default)]
    pub text: String,
}

impl LinkInput {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Raises risk.
    Negative,
    /// Lowers risk.
    Positive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub kind: FlagKind,
    pub message: String,
}

impl Flag {
    pub fn negative(message: impl Into<String>) -> Self {
        Self {
            kind: FlagKind::Negative,
            message: message.into(),
        }
    }

    pub fn positive(message: impl Into<String>) -> Self {
        Self {
            kind: FlagKind::Positive,
            message: message.into(),
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            FlagKind::Negative => "🚩",
            FlagKind::Positive => "✅",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Output of both analyzers. Flags keep their discovery order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub phishing_probability: f64,
    pub explanation: String,
    pub flags: Vec<Flag>,
}

impl ScoreResult {
    /// Low-confidence result returned when analysis of an item faults.
    pub fn unavailable(probability: f64, explanation: &str) -> Self {
        Self {
            phishing_probability: probability,
            explanation: explanation.to_string(),
            flags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub href: String,
    pub display_text: String,
    pub phishing_probability: f64,
    pub trust_percent: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAnalysis {
    pub phishing_probability: f64,
    pub trust_percent: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub flags: Vec<Flag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub email: EmailAnalysis,
    /// Sorted by descending phishing probability.
    pub links: Vec<LinkAnalysis>,
    pub overall_risk_level: RiskLevel,
}

/// Answer to a single-URL query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlReport {
    pub url: String,
    pub phishing_probability: f64,
    pub trust_percent: u8,
    pub risk_level: RiskLevel,
    pub explanation: String,
    pub flags: Vec<Flag>,
    pub features: UrlFeatures,
}
