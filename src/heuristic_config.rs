use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Fixed-weight rule tables and constants used by both analyzers.
///
/// Every table is an ordered list: order decides flag order and, for
/// legitimate domains, which entry wins when several match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicConfig {
    pub email: EmailHeuristics,
    pub url: UrlHeuristics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhraseRule {
    pub phrase: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmailHeuristics {
    pub base_probability: f64,
    pub per_indicator: f64,
    pub max_probability: f64,
    pub fallback_probability: f64,
    pub phrases: Vec<PhraseRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LegitimateDomain {
    pub domain: String,
    pub name: String,
}

/// Indicator score adjustments; negative values lower risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlWeights {
    pub ip_address: i32,
    pub shortener: i32,
    pub excessive_hyphens: i32,
    pub suspicious_tld: i32,
    pub https: i32,
    pub missing_https: i32,
    pub legitimate_domain: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrlHeuristics {
    pub base_probability: f64,
    pub per_point: f64,
    pub min_probability: f64,
    pub max_probability: f64,
    pub fallback_probability: f64,
    /// Probabilities below this are explained as safe.
    pub safe_below: f64,
    /// Probabilities below this (and not safe) have "some" suspicious traits.
    pub suspicious_below: f64,
    /// More hyphens than this in the URL raise the score.
    pub max_hyphens: usize,
    pub weights: UrlWeights,
    pub shorteners: Vec<String>,
    pub suspicious_tlds: Vec<String>,
    pub legitimate_domains: Vec<LegitimateDomain>,
}

impl Default for EmailHeuristics {
    fn default() -> Self {
        let phrases = [
            ("verify", "Asks to verify account/identity"),
            ("confirm", "Asks to confirm sensitive information"),
            ("urgent", "Uses urgency to pressure action"),
            ("act now", "Creates false sense of immediacy"),
            ("click here", "Suspicious call-to-action"),
            ("update password", "Requests password update"),
            ("reset password", "Requests password reset"),
            ("suspended", "Claims account is suspended"),
            ("locked", "Claims account is locked"),
            ("unusual activity", "Claims unusual account activity"),
            ("confirm identity", "Asks to confirm identity"),
            ("validate account", "Asks to validate account"),
            ("expire", "Claims something will expire"),
            ("reactivate", "Asks to reactivate account"),
        ]
        .into_iter()
        .map(|(phrase, description)| PhraseRule {
            phrase: phrase.to_string(),
            description: description.to_string(),
        })
        .collect();

        Self {
            base_probability: 0.05,
            per_indicator: 0.08,
            max_probability: 0.9,
            fallback_probability: 0.1,
            phrases,
        }
    }
}

impl Default for UrlWeights {
    fn default() -> Self {
        Self {
            ip_address: 3,
            shortener: 2,
            excessive_hyphens: 2,
            suspicious_tld: 2,
            https: -1,
            missing_https: 1,
            legitimate_domain: -3,
        }
    }
}

impl Default for UrlHeuristics {
    fn default() -> Self {
        let legitimate_domains = [
            ("google.com", "Google official"),
            ("microsoft.com", "Microsoft official"),
            ("apple.com", "Apple official"),
            ("github.com", "GitHub official"),
            ("stackoverflow.com", "Stack Overflow official"),
            ("amazon.com", "Amazon official"),
            ("facebook.com", "Facebook official"),
            ("twitter.com", "Twitter official"),
            ("linkedin.com", "LinkedIn official"),
            ("instagram.com", "Instagram official"),
            ("youtube.com", "YouTube official"),
            ("reddit.com", "Reddit official"),
        ]
        .into_iter()
        .map(|(domain, name)| LegitimateDomain {
            domain: domain.to_string(),
            name: name.to_string(),
        })
        .collect();

        Self {
            base_probability: 0.02,
            per_point: 0.05,
            min_probability: 0.02,
            max_probability: 0.8,
            fallback_probability: 0.05,
            safe_below: 0.1,
            suspicious_below: 0.4,
            max_hyphens: 5,
            weights: UrlWeights::default(),
            shorteners: vec![
                "bit.ly".to_string(),
                "tinyurl".to_string(),
                "short.link".to_string(),
            ],
            suspicious_tlds: vec![
                ".tk".to_string(),
                ".ml".to_string(),
                ".ga".to_string(),
                ".ru".to_string(),
                ".xyz".to_string(),
            ],
            legitimate_domains,
        }
    }
}

impl HeuristicConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read heuristics file: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid heuristics file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: HeuristicConfig =
            serde_yaml::from_str(content).context("Failed to parse heuristics YAML")?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded heuristics from: {}", path.as_ref().display());
                config
            }
            Err(e) => {
                log::warn!("Failed to load heuristics ({:#}), using defaults", e);
                Self::default()
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize heuristics")
    }

    /// Lower-case every phrase and domain; matching runs on lower-cased text.
    fn normalize(&mut self) {
        for rule in &mut self.email.phrases {
            rule.phrase = rule.phrase.trim().to_lowercase();
        }
        for entry in self
            .url
            .shorteners
            .iter_mut()
            .chain(self.url.suspicious_tlds.iter_mut())
        {
            *entry = entry.trim().to_lowercase();
        }
        for legit in &mut self.url.legitimate_domains {
            legit.domain = legit.domain.trim().to_lowercase();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let email = &self.email;
        check_probability("email.base_probability", email.base_probability)?;
        check_probability("email.max_probability", email.max_probability)?;
        check_probability("email.fallback_probability", email.fallback_probability)?;
        ensure!(
            email.per_indicator.is_finite() && email.per_indicator >= 0.0,
            "email.per_indicator must be a non-negative number"
        );
        ensure!(
            email.base_probability <= email.max_probability,
            "email.base_probability exceeds email.max_probability"
        );
        check_unique("email.phrases", email.phrases.iter().map(|r| r.phrase.as_str()))?;

        let url = &self.url;
        check_probability("url.base_probability", url.base_probability)?;
        check_probability("url.min_probability", url.min_probability)?;
        check_probability("url.max_probability", url.max_probability)?;
        check_probability("url.fallback_probability", url.fallback_probability)?;
        check_probability("url.safe_below", url.safe_below)?;
        check_probability("url.suspicious_below", url.suspicious_below)?;
        ensure!(url.per_point.is_finite(), "url.per_point must be finite");
        ensure!(
            url.min_probability <= url.max_probability,
            "url.min_probability exceeds url.max_probability"
        );
        ensure!(
            url.safe_below <= url.suspicious_below,
            "url.safe_below exceeds url.suspicious_below"
        );
        check_unique("url.shorteners", url.shorteners.iter().map(String::as_str))?;
        check_unique(
            "url.suspicious_tlds",
            url.suspicious_tlds.iter().map(String::as_str),
        )?;
        check_unique(
            "url.legitimate_domains",
            url.legitimate_domains.iter().map(|d| d.domain.as_str()),
        )?;
        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        bail!("{} must be within [0, 1], got {}", name, value);
    }
    Ok(())
}

fn check_unique<'a>(name: &str, entries: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for entry in entries {
        if entry.is_empty() {
            bail!("{} contains an empty entry", name);
        }
        if !seen.insert(entry) {
            bail!("{} contains duplicate entry '{}'", name, entry);
        }
    }
    Ok(())
}
