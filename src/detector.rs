use crate::error::DetectorError;
use crate::features::{EmailAnalyzer, UrlAnalyzer};
use crate::heuristic_config::HeuristicConfig;
use crate::html_text::HtmlTextExtractor;
use crate::model::{
    AnalysisInput, AnalysisReport, EmailAnalysis, LinkAnalysis, LinkInput, ScoreResult,
    UrlReport,
};
use crate::risk::{round_probability, trust_percent, RiskLevel};

const DISPLAY_TEXT_LIMIT: usize = 100;
const HREF_DISPLAY_LIMIT: usize = 50;
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:"];

/// Runs both analyzers over one email and merges their verdicts.
///
/// Holds only immutable rule tables, so one instance can serve any number of
/// requests (and threads) without shared mutable state.
pub struct PhishingDetector {
    email_analyzer: EmailAnalyzer,
    url_analyzer: UrlAnalyzer,
    html_extractor: HtmlTextExtractor,
}

impl Default for PhishingDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PhishingDetector {
    pub fn new() -> Self {
        Self::from_config(&HeuristicConfig::default())
    }

    pub fn from_config(config: &HeuristicConfig) -> Self {
        Self {
            email_analyzer: EmailAnalyzer::from_config(config),
            url_analyzer: UrlAnalyzer::from_config(config),
            html_extractor: HtmlTextExtractor::new(),
        }
    }

    pub fn analyze(&self, input: &AnalysisInput) -> Result<AnalysisReport, DetectorError> {
        if input.body_text.is_empty() && input.body_html.is_empty() {
            log::warn!("Rejecting email without body text or HTML");
            return Err(DetectorError::MissingBody);
        }

        log::debug!(
            "Analyzing email from '{}' with {} links",
            input.sender,
            input.links.len()
        );

        let body_text = if input.body_text.is_empty() {
            self.html_extractor.extract_text(&input.body_html)
        } else {
            input.body_text.clone()
        };
        let email_result = self.email_analyzer.analyze_email(&input.subject, &body_text);

        // Collect per link first, then aggregate; a skipped link never
        // touches the others
        let analyzed: Vec<(f64, LinkAnalysis)> = input
            .links
            .iter()
            .enumerate()
            .filter_map(|(index, link)| self.analyze_link(index, link))
            .collect();

        // Combine unrounded scores; the report only shows rounded ones
        let max_url_probability = analyzed
            .iter()
            .map(|(probability, _)| *probability)
            .fold(0.0_f64, f64::max);
        let mut links: Vec<LinkAnalysis> = analyzed.into_iter().map(|(_, link)| link).collect();

        let combined =
            combine_probabilities(email_result.phishing_probability, max_url_probability)?;
        let overall_risk_level = RiskLevel::from_probability(combined);

        // Stable sort keeps input order among equal probabilities
        links.sort_by(|a, b| b.phishing_probability.total_cmp(&a.phishing_probability));

        log::info!(
            "Email risk {}, {} links analyzed, overall risk {}",
            RiskLevel::from_probability(email_result.phishing_probability),
            links.len(),
            overall_risk_level
        );

        Ok(AnalysisReport {
            email: email_analysis(email_result),
            links,
            overall_risk_level,
        })
    }

    pub fn analyze_url(&self, url: &str) -> Result<UrlReport, DetectorError> {
        if url.is_empty() {
            return Err(DetectorError::MissingUrl);
        }

        let result = self.url_analyzer.analyze_url(url);
        let trust = trust_percent(result.phishing_probability);

        Ok(UrlReport {
            url: url.to_string(),
            phishing_probability: round_probability(result.phishing_probability),
            trust_percent: trust,
            risk_level: RiskLevel::from_trust_percent(trust),
            explanation: result.explanation,
            flags: result.flags,
            features: self.url_analyzer.extract_features(url),
        })
    }

    /// Raw probability plus presentation record, or `None` for links that
    /// are not web destinations.
    fn analyze_link(&self, index: usize, link: &LinkInput) -> Option<(f64, LinkAnalysis)> {
        let href = link.href.as_str();
        if href.is_empty() || SKIPPED_SCHEMES.iter().any(|s| href.starts_with(s)) {
            log::debug!("Skipping non-HTTP link {}", index);
            return None;
        }

        let result = self.url_analyzer.analyze_url(href);
        let trust = trust_percent(result.phishing_probability);
        let display_text = if link.text.is_empty() {
            truncate_chars(href, HREF_DISPLAY_LIMIT)
        } else {
            truncate_chars(&link.text, DISPLAY_TEXT_LIMIT)
        };

        let analysis = LinkAnalysis {
            href: href.to_string(),
            display_text,
            phishing_probability: round_probability(result.phishing_probability),
            trust_percent: trust,
            risk_level: RiskLevel::from_trust_percent(trust),
            explanation: result.explanation,
            flags: result.flags,
        };
        Some((result.phishing_probability, analysis))
    }
}

/// Probability that at least one of two independent risk sources fires.
pub fn combine_probabilities(email: f64, worst_url: f64) -> Result<f64, DetectorError> {
    let combined = 1.0 - (1.0 - email) * (1.0 - worst_url);
    if !combined.is_finite() || !(0.0..=1.0).contains(&combined) {
        return Err(DetectorError::Combination(format!(
            "combined probability {} out of range (email {}, url {})",
            combined, email, worst_url
        )));
    }
    Ok(combined)
}

fn email_analysis(result: ScoreResult) -> EmailAnalysis {
    let trust = trust_percent(result.phishing_probability);
    EmailAnalysis {
        phishing_probability: round_probability(result.phishing_probability),
        trust_percent: trust,
        risk_level: RiskLevel::from_trust_percent(trust),
        explanation: result.explanation,
        flags: result.flags,
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(body: &str, links: Vec<LinkInput>) -> AnalysisInput {
        AnalysisInput {
            sender: "alerts@example.com".to_string(),
            subject: "Weekly digest".to_string(),
            body_text: body.to_string(),
            body_html: String::new(),
            links,
        }
    }

    #[test]
    fn test_rejects_missing_body() {
        let detector = PhishingDetector::new();
        let result = detector.analyze(&input("", vec![]));
        assert_eq!(result, Err(DetectorError::MissingBody));
    }

    #[test]
    fn test_no_links_uses_email_only() {
        let detector = PhishingDetector::new();
        let report = detector.analyze(&input("See you at noon.", vec![])).unwrap();

        assert!(report.links.is_empty());
        assert_eq!(report.email.phishing_probability, 0.05);
        assert_eq!(report.email.trust_percent, 95);
        assert_eq!(report.email.risk_level, RiskLevel::Safe);
        assert_eq!(report.overall_risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_combines_worst_link_with_email() {
        let detector = PhishingDetector::new();
        let report = detector
            .analyze(&input(
                "See you at noon.",
                vec![
                    LinkInput::new("https://www.google.com", "Google"),
                    LinkInput::new("http://192.168.1.1-a-b-c-d-e-f.tk", ""),
                ],
            ))
            .unwrap();

        assert_eq!(report.links.len(), 2);
        assert_eq!(report.links[0].href, "http://192.168.1.1-a-b-c-d-e-f.tk");
        assert_eq!(report.links[0].phishing_probability, 0.42);
        assert_eq!(report.links[0].trust_percent, 58);
        assert_eq!(report.links[0].risk_level, RiskLevel::Suspicious);
        assert_eq!(report.links[1].phishing_probability, 0.02);
        assert_eq!(report.links[1].risk_level, RiskLevel::Safe);
        // 1 - 0.95 * 0.58 = 0.449 -> trust 55
        assert_eq!(report.overall_risk_level, RiskLevel::Suspicious);
    }

    #[test]
    fn test_combine_probabilities() {
        let combined = combine_probabilities(0.05, 0.42).unwrap();
        assert!((combined - 0.449).abs() < 1e-9);
        assert_eq!(trust_percent(combined), 55);
        assert!((combine_probabilities(0.05, 0.0).unwrap() - 0.05).abs() < 1e-9);
        assert!(combine_probabilities(f64::NAN, 0.1).is_err());
        assert!(combine_probabilities(1.5, 0.1).is_err());
    }

    #[test]
    fn test_skips_non_web_links() {
        let detector = PhishingDetector::new();
        let report = detector
            .analyze(&input(
                "Contact us",
                vec![
                    LinkInput::new("mailto:a@b.com", "Email us"),
                    LinkInput::new("javascript:void(0)", "Menu"),
                    LinkInput::new("", "Empty"),
                    LinkInput::new("https://github.com/org/repo", "Repo"),
                ],
            ))
            .unwrap();

        assert_eq!(report.links.len(), 1);
        assert_eq!(report.links[0].href, "https://github.com/org/repo");
        assert!(report.links.iter().all(|l| !l.href.starts_with("mailto:")));
    }

    #[test]
    fn test_links_sorted_descending() {
        let detector = PhishingDetector::new();
        let report = detector
            .analyze(&input(
                "Hello",
                vec![
                    LinkInput::new("https://www.google.com", ""),
                    LinkInput::new("http://bit.ly/x", ""),
                    LinkInput::new("https://example.org", ""),
                    LinkInput::new("http://192.168.1.1-a-b-c-d-e-f.tk", ""),
                ],
            ))
            .unwrap();

        let probabilities: Vec<f64> = report.links.iter().map(|l| l.phishing_probability).collect();
        assert!(probabilities.windows(2).all(|w| w[0] >= w[1]));
        // Equal probabilities keep input order
        assert_eq!(report.links[2].href, "https://www.google.com");
        assert_eq!(report.links[3].href, "https://example.org");
    }

    #[test]
    fn test_failed_link_does_not_abort_report() {
        // Two or more indicator points overflow to infinity; fewer stay finite
        let mut config = HeuristicConfig::default();
        config.url.per_point = f64::MAX;
        let detector = PhishingDetector::from_config(&config);

        let report = detector
            .analyze(&input(
                "Hello",
                vec![
                    LinkInput::new("https://example.org", ""),
                    LinkInput::new("http://bit.ly/x", ""),
                ],
            ))
            .unwrap();

        assert_eq!(report.links.len(), 2);
        assert_eq!(report.links[0].href, "http://bit.ly/x");
        assert_eq!(report.links[0].explanation, "URL analysis unavailable");
        assert_eq!(report.links[0].phishing_probability, 0.05);
        assert!(report.links[0].flags.is_empty());
        assert_eq!(report.links[1].href, "https://example.org");
        assert_eq!(report.links[1].phishing_probability, 0.02);
        assert!(!report.links[1].flags.is_empty());
    }

    #[test]
    fn test_padded_link_still_raises_overall_risk() {
        let detector = PhishingDetector::new();
        let padded = format!(
            "http://192.168.1.1-a-b-c-d-e-f.tk/login?pad={}",
            "a".repeat(8200)
        );
        let report = detector
            .analyze(&input("See you at noon.", vec![LinkInput::new(padded, "")]))
            .unwrap();

        assert_eq!(report.links[0].phishing_probability, 0.42);
        assert_eq!(report.links[0].flags.len(), 4);
        assert_eq!(report.overall_risk_level, RiskLevel::Suspicious);
    }

    #[test]
    fn test_display_text_truncation() {
        let detector = PhishingDetector::new();
        let long_href = format!("https://example.com/{}", "a".repeat(80));
        let report = detector
            .analyze(&input(
                "Hello",
                vec![
                    LinkInput::new(long_href.clone(), ""),
                    LinkInput::new("https://example.net", "é".repeat(150)),
                ],
            ))
            .unwrap();

        let by_href = |href: &str| report.links.iter().find(|l| l.href == href).unwrap();
        assert_eq!(by_href(&long_href).display_text, long_href[..50]);
        assert_eq!(
            by_href("https://example.net").display_text.chars().count(),
            100
        );
    }

    #[test]
    fn test_html_body_fallback() {
        let detector = PhishingDetector::new();
        let mut email = input("", vec![]);
        email.body_html = "<p>Your account is <b>suspended</b>. Click here.</p>".to_string();

        let report = detector.analyze(&email).unwrap();
        assert_eq!(report.email.flags.len(), 2);
        assert_eq!(report.email.phishing_probability, 0.21);
    }

    #[test]
    fn test_analyze_url() {
        let detector = PhishingDetector::new();

        assert_eq!(detector.analyze_url(""), Err(DetectorError::MissingUrl));

        let report = detector.analyze_url("http://192.168.1.1-a-b-c-d-e-f.tk").unwrap();
        assert_eq!(report.phishing_probability, 0.42);
        assert_eq!(report.trust_percent, 58);
        assert_eq!(report.risk_level, RiskLevel::Suspicious);
        assert!(report.features.has_ip);
        assert!(!report.features.is_https);
    }
}
