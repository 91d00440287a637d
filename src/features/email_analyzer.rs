use super::{finite, Analyzer};
use crate::error::AnalysisError;
use crate::heuristic_config::{EmailHeuristics, HeuristicConfig};
use crate::model::{Flag, ScoreResult};

pub const DEFAULT_SUBJECT: &str = "Unknown Subject";

/// Subject and plain-text body of one email.
#[derive(Debug, Clone, Copy)]
pub struct EmailText<'a> {
    pub subject: &'a str,
    pub body: &'a str,
}

/// Scores email text by counting distinct phishing phrases.
pub struct EmailAnalyzer {
    heuristics: EmailHeuristics,
}

impl Default for EmailAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailAnalyzer {
    pub fn new() -> Self {
        Self::from_config(&HeuristicConfig::default())
    }

    pub fn from_config(config: &HeuristicConfig) -> Self {
        Self {
            heuristics: config.email.clone(),
        }
    }

    pub fn analyze_email(&self, subject: &str, body: &str) -> ScoreResult {
        self.analyze(&EmailText { subject, body })
    }

    fn explanation(suspicious_count: usize) -> &'static str {
        match suspicious_count {
            0 => "✅ No phishing indicators detected. Email appears legitimate.",
            1..=2 => "⚠️ Minor phishing indicators detected. Review with caution.",
            _ => "🚨 Multiple phishing indicators detected. High risk of phishing attack.",
        }
    }
}

impl<'a> Analyzer<EmailText<'a>> for EmailAnalyzer {
    fn score(&self, email: &EmailText<'a>) -> Result<ScoreResult, AnalysisError> {
        let subject = if email.subject.is_empty() {
            DEFAULT_SUBJECT
        } else {
            email.subject
        };

        let combined_text = format!("{} {}", subject, email.body).to_lowercase();

        // Each phrase counts once, in table order
        let flags: Vec<Flag> = self
            .heuristics
            .phrases
            .iter()
            .filter(|rule| combined_text.contains(rule.phrase.as_str()))
            .map(|rule| {
                log::debug!("Found phishing phrase: {}", rule.phrase);
                Flag::negative(format!("{} ('{}' detected)", rule.description, rule.phrase))
            })
            .collect();

        let suspicious_count = flags.len();
        let h = &self.heuristics;
        let raw = h.base_probability + h.per_indicator * suspicious_count as f64;
        let probability = finite(raw, "email text")?.min(h.max_probability);

        log::debug!(
            "Email phrases found: {}, phishing probability: {}",
            suspicious_count,
            probability
        );

        Ok(ScoreResult {
            phishing_probability: probability,
            explanation: Self::explanation(suspicious_count).to_string(),
            flags,
        })
    }

    fn fallback(&self) -> ScoreResult {
        ScoreResult::unavailable(self.heuristics.fallback_probability, "Analysis unavailable")
    }

    fn name(&self) -> &str {
        "email_analyzer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FlagKind;

    #[test]
    fn test_clean_email_gets_baseline() {
        let analyzer = EmailAnalyzer::new();
        let result = analyzer.analyze_email("Lunch", "See you at noon tomorrow.");

        assert_eq!(result.phishing_probability, 0.05);
        assert!(result.flags.is_empty());
        assert!(result.explanation.contains("appears legitimate"));
    }

    #[test]
    fn test_minor_indicators() {
        let analyzer = EmailAnalyzer::new();
        let result = analyzer.analyze_email("URGENT", "Please click here.");

        assert_eq!(result.flags.len(), 2);
        assert!((result.phishing_probability - 0.21).abs() < 1e-9);
        assert!(result.explanation.contains("Minor phishing indicators"));
        assert!(result.flags.iter().all(|f| f.kind == FlagKind::Negative));
    }

    #[test]
    fn test_flags_follow_table_order_and_count_once() {
        let analyzer = EmailAnalyzer::new();
        let result = analyzer.analyze_email(
            "",
            "Reactivate now. Urgent urgent urgent! We need you to verify.",
        );

        let messages: Vec<&str> = result.flags.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Asks to verify account/identity ('verify' detected)",
                "Uses urgency to pressure action ('urgent' detected)",
                "Asks to reactivate account ('reactivate' detected)",
            ]
        );
        assert!(result.explanation.contains("Multiple phishing indicators"));
    }

    #[test]
    fn test_probability_is_capped() {
        let analyzer = EmailAnalyzer::new();
        let body = "verify confirm urgent act now click here update password \
                    reset password suspended locked unusual activity expire";
        let result = analyzer.analyze_email("Account notice", body);

        assert!(result.flags.len() >= 11);
        assert_eq!(result.phishing_probability, 0.9);
    }

    #[test]
    fn test_subject_defaults_when_empty() {
        let mut config = HeuristicConfig::default();
        config.email.phrases.push(crate::heuristic_config::PhraseRule {
            phrase: "unknown subject".to_string(),
            description: "Missing subject".to_string(),
        });
        let analyzer = EmailAnalyzer::from_config(&config);

        assert_eq!(analyzer.analyze_email("", "hello").flags.len(), 1);
        assert!(analyzer.analyze_email("Hi", "hello").flags.is_empty());
    }

    #[test]
    fn test_large_body_is_fully_scored() {
        let analyzer = EmailAnalyzer::new();
        let body = format!(
            "urgent verify click here suspended{}",
            " ".repeat(3 * 1024 * 1024)
        );
        let result = analyzer.analyze_email("Notice", &body);

        assert_eq!(result.flags.len(), 4);
        assert!((result.phishing_probability - 0.37).abs() < 1e-9);
        assert!(result.explanation.contains("Multiple phishing indicators"));
    }

    #[test]
    fn test_non_finite_weights_fall_back() {
        let mut config = HeuristicConfig::default();
        config.email.per_indicator = f64::NAN;
        let analyzer = EmailAnalyzer::from_config(&config);

        let text = EmailText {
            subject: "urgent",
            body: "verify",
        };
        assert_eq!(
            analyzer.score(&text),
            Err(AnalysisError::NonFiniteScore { item: "email text" })
        );

        let result = analyzer.analyze(&text);
        assert_eq!(result.phishing_probability, 0.1);
        assert_eq!(result.explanation, "Analysis unavailable");
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_repeatable() {
        let analyzer = EmailAnalyzer::new();
        let first = analyzer.analyze_email("Locked", "Your account is locked, act now");
        let second = analyzer.analyze_email("Locked", "Your account is locked, act now");
        assert_eq!(first, second);
    }
}
