use super::{finite, Analyzer};
use crate::domain_utils::DomainUtils;
use crate::error::AnalysisError;
use crate::heuristic_config::{HeuristicConfig, UrlHeuristics};
use crate::model::{Flag, ScoreResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// TLDs counted by the informational feature vector. Broader than the
/// scoring list.
const FEATURE_TLDS: &[&str] = &[".ru", ".tk", ".xyz", ".online", ".top", ".ml", ".ga"];

/// Lexical shape of a URL, reported alongside single-URL queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlFeatures {
    pub length: usize,
    pub dot_count: usize,
    pub hyphen_count: usize,
    pub digit_count: usize,
    pub has_ip: bool,
    pub suspicious_tld: bool,
    pub subdomain_count: usize,
    pub is_https: bool,
}

/// Scores a single URL from structural and lexical signals.
pub struct UrlAnalyzer {
    heuristics: UrlHeuristics,
    ip_regex: Regex,
}

impl Default for UrlAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlAnalyzer {
    pub fn new() -> Self {
        Self::from_config(&HeuristicConfig::default())
    }

    pub fn from_config(config: &HeuristicConfig) -> Self {
        Self {
            heuristics: config.url.clone(),
            ip_regex: Regex::new(r"(\d{1,3}\.){3}\d{1,3}").unwrap(),
        }
    }

    pub fn analyze_url(&self, url: &str) -> ScoreResult {
        self.analyze(url)
    }

    pub fn extract_features(&self, url: &str) -> UrlFeatures {
        let host = DomainUtils::extract_host(url);
        let dot_count = host.matches('.').count();

        UrlFeatures {
            length: url.chars().count(),
            dot_count,
            hyphen_count: host.matches('-').count(),
            digit_count: url.chars().filter(|c| c.is_ascii_digit()).count(),
            has_ip: self.ip_regex.is_match(url),
            suspicious_tld: FEATURE_TLDS.iter().any(|tld| host.contains(tld)),
            subdomain_count: dot_count.saturating_sub(1),
            is_https: DomainUtils::is_https(url),
        }
    }

    fn explanation(&self, probability: f64) -> &'static str {
        if probability < self.heuristics.safe_below {
            "✅ URL appears safe and legitimate"
        } else if probability < self.heuristics.suspicious_below {
            "⚠️ URL has some suspicious characteristics"
        } else {
            "🚨 URL has multiple suspicious characteristics"
        }
    }
}

impl Analyzer<str> for UrlAnalyzer {
    fn score(&self, url: &str) -> Result<ScoreResult, AnalysisError> {
        let h = &self.heuristics;
        let w = &h.weights;
        let url_lower = url.to_lowercase();
        let host = DomainUtils::extract_host(url);
        let mut indicators = 0i32;
        let mut flags = Vec::new();

        if self.ip_regex.is_match(&url_lower) {
            indicators += w.ip_address;
            flags.push(Flag::negative(
                "IP address used instead of domain name (suspicious)",
            ));
            log::debug!("IP address pattern in {}", url);
        }

        if h.shorteners.iter().any(|s| host.contains(s.as_str())) {
            indicators += w.shortener;
            flags.push(Flag::negative(
                "URL shortener detected (hides true destination)",
            ));
            log::debug!("URL shortener in {}", url);
        }

        if url_lower.matches('-').count() > h.max_hyphens {
            indicators += w.excessive_hyphens;
            flags.push(Flag::negative("Unusual number of hyphens in URL"));
            log::debug!("Excessive hyphens in {}", url);
        }

        if h.suspicious_tlds.iter().any(|tld| host.contains(tld.as_str())) {
            indicators += w.suspicious_tld;
            flags.push(Flag::negative(format!(
                "Suspicious top-level domain ({})",
                h.suspicious_tlds.join("/")
            )));
            log::debug!("Suspicious TLD in {}", url);
        }

        if DomainUtils::is_https(url) {
            indicators += w.https;
            flags.push(Flag::positive("Uses secure HTTPS protocol"));
        } else {
            indicators += w.missing_https;
            flags.push(Flag::negative("Not using HTTPS encryption"));
        }

        // First match wins; table order matters when several domains match
        if let Some(legit) = h
            .legitimate_domains
            .iter()
            .find(|d| host.contains(d.domain.as_str()))
        {
            indicators += w.legitimate_domain;
            flags.push(Flag::positive(format!(
                "Verified legitimate domain ({})",
                legit.name
            )));
            log::debug!("Legitimate domain {} in {}", legit.domain, url);
        }

        let raw = h.base_probability + f64::from(indicators) * h.per_point;
        let probability = finite(raw, "url")?
            .max(h.min_probability)
            .min(h.max_probability);

        log::debug!(
            "URL indicator score: {}, phishing probability: {}",
            indicators,
            probability
        );

        Ok(ScoreResult {
            phishing_probability: probability,
            explanation: self.explanation(probability).to_string(),
            flags,
        })
    }

    fn fallback(&self) -> ScoreResult {
        ScoreResult::unavailable(self.heuristics.fallback_probability, "URL analysis unavailable")
    }

    fn name(&self) -> &str {
        "url_analyzer"
    }
}
