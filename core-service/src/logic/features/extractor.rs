//! URL Feature Extractor
//!
//! Pure transformation: URL string → (FeatureVector, explanations).
//! Walks `Feature::ALL` in layout order, so vector slots and explanation
//! order both come from the schema.
//!
//! A feature that cannot be computed degrades to 0 and is reported in
//! `Extraction::degraded`; extraction as a whole never fails.

use serde::Serialize;

use crate::logic::error::ScoringError;
use super::layout::Feature;
use super::url::{DomainParts, HostKind, ParsedUrl};
use super::vector::FeatureVector;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Brand and credential words common in phishing URLs
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login", "signin", "account", "verify", "secure", "update",
    "confirm", "banking", "paypal", "ebay", "amazon", "apple",
    "microsoft", "google", "facebook", "password", "wallet",
];

/// Low-reputation top-level suffixes
pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top"];

/// `url_length` above this is explained
pub const MAX_URL_LENGTH: f64 = 75.0;
/// `num_dots` above this is explained
pub const MAX_DOTS: f64 = 4.0;
/// `num_hyphens` above this is explained
pub const MAX_HYPHENS: f64 = 2.0;
/// `digit_ratio_in_domain` above this is explained
pub const MAX_DIGIT_RATIO: f64 = 0.3;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// One feature fell back to 0
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("feature `{feature}` degraded to 0: {reason}")]
pub struct ExtractionDegraded {
    pub feature: Feature,
    pub reason: String,
}

/// Output of one extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub vector: FeatureVector,
    /// Human-readable warnings, in layout order
    pub explanations: Vec<String>,
    /// Features that could not be computed
    pub degraded: Vec<ExtractionDegraded>,
}

impl Extraction {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

// ============================================================================
// EXTRACTOR
// ============================================================================

/// Everything derived from the URL once, shared by all feature rules
struct UrlContext {
    parsed: ParsedUrl,
    lowered: String,
    host_kind: Result<HostKind, url::ParseError>,
    parts: DomainParts,
}

impl UrlContext {
    fn new(raw: &str) -> Self {
        let parsed = ParsedUrl::parse(raw);
        let lowered = parsed.normalized.to_lowercase();
        let host_kind = parsed.host_kind();
        let parts = DomainParts::split(
            &parsed.host,
            host_kind.clone().unwrap_or(HostKind::Domain),
        );
        Self { parsed, lowered, host_kind, parts }
    }
}

/// Lexical URL feature extractor
#[derive(Debug, Clone)]
pub struct UrlFeatureExtractor {
    keywords: Vec<String>,
    suspicious_tlds: Vec<String>,
}

impl Default for UrlFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlFeatureExtractor {
    pub fn new() -> Self {
        Self {
            keywords: SUSPICIOUS_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            suspicious_tlds: SUSPICIOUS_TLDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extract all features from `url`.
    pub fn extract(&self, url: &str) -> Extraction {
        let ctx = UrlContext::new(url);
        let mut vector = FeatureVector::new();
        let mut explanations = Vec::new();
        let mut degraded = Vec::new();

        for feature in Feature::ALL {
            let value = match self.compute(feature, &ctx) {
                Ok(value) => value,
                Err(e) => {
                    degraded.push(e);
                    0.0
                }
            };
            vector.set(feature, value);
            if let Some(line) = explain(feature, value) {
                explanations.push(line);
            }
        }

        if !degraded.is_empty() {
            log::debug!(
                "{} feature(s) degraded for {}: {}",
                degraded.len(),
                ctx.parsed.normalized,
                degraded.iter().map(|d| d.to_string()).collect::<Vec<_>>().join("; ")
            );
        }

        Extraction { vector, explanations, degraded }
    }

    /// Like `extract`, but rejects empty input first.
    pub fn extract_checked(&self, url: &str) -> Result<Extraction, ScoringError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(ScoringError::InvalidInput("no url provided".to_string()));
        }
        Ok(self.extract(trimmed))
    }

    fn compute(&self, feature: Feature, ctx: &UrlContext) -> Result<f64, ExtractionDegraded> {
        let url = ctx.parsed.normalized.as_str();

        let value = match feature {
            Feature::UrlLength => url.chars().count() as f64,
            Feature::DomainLength => ctx.parts.domain.chars().count() as f64,
            Feature::HasHttps => flag(ctx.parsed.scheme == "https"),
            Feature::NumDots => count_char(url, '.'),
            Feature::NumHyphens => count_char(url, '-'),
            Feature::NumUnderscores => count_char(url, '_'),
            Feature::NumAtSymbols => count_char(url, '@'),
            Feature::NumQuestionMarks => count_char(url, '?'),
            Feature::NumAmpersands => count_char(url, '&'),
            Feature::NumEquals => count_char(url, '='),
            Feature::HasIpAddress => match &ctx.host_kind {
                Ok(kind) => flag(*kind == HostKind::Ipv4),
                Err(e) => {
                    return Err(ExtractionDegraded {
                        feature,
                        reason: format!("host `{}` is not parseable: {}", ctx.parsed.host, e),
                    })
                }
            },
            Feature::NumSuspiciousKeywords => self
                .keywords
                .iter()
                .filter(|k| ctx.lowered.contains(k.as_str()))
                .count() as f64,
            Feature::HasSuspiciousTld => {
                let target = if ctx.parsed.host.is_empty() {
                    ctx.lowered.as_str()
                } else {
                    ctx.parsed.host.as_str()
                };
                flag(self.suspicious_tlds.iter().any(|tld| target.ends_with(tld.as_str())))
            }
            Feature::NumSpecialChars => {
                url.chars().filter(|c| !c.is_ascii_alphanumeric()).count() as f64
            }
            Feature::SubdomainCount => ctx.parts.subdomain_count() as f64,
            Feature::PathLength => ctx.parsed.path.chars().count() as f64,
            Feature::HasPort => match ctx.parsed.port_number() {
                Ok(port) => flag(matches!(port, Some(p) if p != 0)),
                Err(text) => {
                    return Err(ExtractionDegraded {
                        feature,
                        reason: format!("port `{}` is out of range", text),
                    })
                }
            },
            Feature::DigitRatioInDomain => {
                let domain = &ctx.parts.domain;
                let len = domain.chars().count();
                if len == 0 {
                    0.0
                } else {
                    domain.chars().filter(|c| c.is_ascii_digit()).count() as f64 / len as f64
                }
            }
        };

        Ok(value)
    }
}

/// Explanation line for a feature value, if it crosses its threshold
fn explain(feature: Feature, value: f64) -> Option<String> {
    match feature {
        Feature::UrlLength if value > MAX_URL_LENGTH => {
            Some(format!("Unusually long URL ({} characters)", value as u64))
        }
        Feature::HasHttps if value == 0.0 => Some("Not using HTTPS (unsecure)".to_string()),
        Feature::NumDots if value > MAX_DOTS => {
            Some(format!("Too many subdomains ({} dots)", value as u64))
        }
        Feature::NumHyphens if value > MAX_HYPHENS => {
            Some(format!("Suspicious use of hyphens ({})", value as u64))
        }
        Feature::NumAtSymbols if value > 0.0 => {
            Some("Contains @ symbol (common phishing technique)".to_string())
        }
        Feature::HasIpAddress if value == 1.0 => {
            Some("Using IP address instead of domain name".to_string())
        }
        Feature::NumSuspiciousKeywords if value > 0.0 => {
            Some(format!("Contains {} suspicious keyword(s)", value as u64))
        }
        Feature::HasSuspiciousTld if value == 1.0 => {
            Some("Uses high-risk domain extension".to_string())
        }
        Feature::DigitRatioInDomain if value > MAX_DIGIT_RATIO => {
            Some("Domain contains many numbers".to_string())
        }
        _ => None,
    }
}

fn flag(condition: bool) -> f64 {
    if condition { 1.0 } else { 0.0 }
}

fn count_char(text: &str, needle: char) -> f64 {
    text.chars().filter(|&c| c == needle).count() as f64
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(url: &str) -> Extraction {
        UrlFeatureExtractor::new().extract(url)
    }

    #[test]
    fn test_phishing_scenario() {
        let out = extract("http://login-paypal-secure.tk/verify?x=1&y=2");
        let v = &out.vector;

        assert_eq!(v.get(Feature::HasHttps), 0.0);
        assert_eq!(v.get(Feature::NumSuspiciousKeywords), 4.0);
        assert_eq!(v.get(Feature::HasSuspiciousTld), 1.0);
        assert_eq!(v.get(Feature::NumHyphens), 2.0);
        assert_eq!(v.get(Feature::NumQuestionMarks), 1.0);
        assert_eq!(v.get(Feature::NumAmpersands), 1.0);
        assert_eq!(v.get(Feature::NumEquals), 2.0);
        assert_eq!(v.get(Feature::PathLength), "/verify".len() as f64);
        assert_eq!(v.get(Feature::DomainLength), "login-paypal-secure".len() as f64);

        assert!(out.explanations.iter().any(|e| e.contains("HTTPS")));
        assert!(out.explanations.iter().any(|e| e.contains("4 suspicious keyword")));
        assert!(out.explanations.iter().any(|e| e.contains("high-risk domain extension")));
        assert!(out.degraded.is_empty());
    }

    #[test]
    fn test_google_scenario() {
        let out = extract("https://www.google.com");
        let v = &out.vector;

        assert_eq!(v.get(Feature::HasHttps), 1.0);
        assert_eq!(v.get(Feature::NumSuspiciousKeywords), 1.0);
        assert_eq!(v.get(Feature::HasSuspiciousTld), 0.0);
        assert_eq!(v.get(Feature::HasIpAddress), 0.0);
        assert_eq!(v.get(Feature::SubdomainCount), 1.0);
        assert_eq!(v.get(Feature::DomainLength), 6.0);
        assert_eq!(v.get(Feature::PathLength), 0.0);
        assert_eq!(v.get(Feature::UrlLength), 22.0);
    }

    #[test]
    fn test_ip_address_scenario() {
        let out = extract("http://192.168.1.1/account");
        assert_eq!(out.vector.get(Feature::HasIpAddress), 1.0);
        assert!(out.explanations.iter().any(|e| e.contains("IP address")));
        // the whole IP stands in for the domain
        assert!(out.vector.get(Feature::DigitRatioInDomain) > MAX_DIGIT_RATIO);
    }

    #[test]
    fn test_url_length_boundary() {
        // "http://" (7) + host + "/" + path padding
        let base = "http://example.com/";
        let at_limit = format!("{}{}", base, "a".repeat(75 - base.len()));
        let over_limit = format!("{}{}", base, "a".repeat(76 - base.len()));
        assert_eq!(at_limit.len(), 75);
        assert_eq!(over_limit.len(), 76);

        let short = extract(&at_limit);
        let long = extract(&over_limit);

        assert_eq!(short.vector.get(Feature::UrlLength), 75.0);
        assert!(!short.explanations.iter().any(|e| e.contains("long URL")));
        assert_eq!(long.vector.get(Feature::UrlLength), 76.0);
        assert!(long.explanations.iter().any(|e| e.contains("long URL (76 characters)")));
    }

    #[test]
    fn test_dots_boundary() {
        let four = extract("http://a.b.c.example.com/");
        let five = extract("http://a.b.c.d.example.com/");

        assert_eq!(four.vector.get(Feature::NumDots), 4.0);
        assert!(!four.explanations.iter().any(|e| e.contains("Too many subdomains")));
        assert_eq!(five.vector.get(Feature::NumDots), 5.0);
        assert!(five.explanations.iter().any(|e| e.contains("Too many subdomains (5 dots)")));
    }

    #[test]
    fn test_hyphens_boundary() {
        let two = extract("http://a-b-c.com/");
        let three = extract("http://a-b-c-d.com/");

        assert_eq!(two.vector.get(Feature::NumHyphens), 2.0);
        assert!(!two.explanations.iter().any(|e| e.contains("hyphens")));
        assert_eq!(three.vector.get(Feature::NumHyphens), 3.0);
        assert!(three.explanations.iter().any(|e| e.contains("hyphens (3)")));
    }

    #[test]
    fn test_digit_ratio_boundary() {
        // 3 digits in a 10 character label
        let at_limit = extract("http://abc1def2g3.com/");
        // 3 digits in 7
        let over_limit = extract("http://ab1cd23.com/");

        assert_eq!(at_limit.vector.get(Feature::DigitRatioInDomain), 0.3);
        assert!(!at_limit.explanations.iter().any(|e| e.contains("many numbers")));
        assert!(over_limit.vector.get(Feature::DigitRatioInDomain) > MAX_DIGIT_RATIO);
        assert!(over_limit.explanations.iter().any(|e| e.contains("Domain contains many numbers")));
    }

    #[test]
    fn test_hosted_platform_domain() {
        let out = extract("http://paypal-login.blogspot.com/x");
        assert_eq!(out.vector.get(Feature::DomainLength), "blogspot".len() as f64);
        assert_eq!(out.vector.get(Feature::SubdomainCount), 1.0);
    }

    #[test]
    fn test_bare_domain_is_prefixed() {
        let out = extract("example.com");
        assert_eq!(out.vector.get(Feature::UrlLength), "http://example.com".len() as f64);
        assert_eq!(out.vector.get(Feature::HasHttps), 0.0);
    }

    #[test]
    fn test_at_symbol_and_port() {
        let out = extract("http://user@bank.example.com:8080/");
        assert_eq!(out.vector.get(Feature::NumAtSymbols), 1.0);
        assert_eq!(out.vector.get(Feature::HasPort), 1.0);
        assert!(out.explanations.iter().any(|e| e.contains("@ symbol")));
    }

    #[test]
    fn test_invalid_port_degrades_only_that_feature() {
        let out = extract("http://example.com:99999/login");
        assert_eq!(out.vector.get(Feature::HasPort), 0.0);
        assert_eq!(out.degraded.len(), 1);
        assert_eq!(out.degraded[0].feature, Feature::HasPort);
        assert_eq!(out.vector.get(Feature::NumSuspiciousKeywords), 1.0);
    }

    #[test]
    fn test_unparseable_host_degrades_ip_check() {
        let out = extract("http://bad host.com/");
        assert_eq!(out.vector.get(Feature::HasIpAddress), 0.0);
        assert!(out.is_degraded());
        assert_eq!(out.degraded[0].feature, Feature::HasIpAddress);
    }

    #[test]
    fn test_explanations_follow_layout_order() {
        let out = extract("http://secure-login-update-account.example.tk/@");
        let https = out.explanations.iter().position(|e| e.contains("HTTPS")).unwrap();
        let hyphens = out.explanations.iter().position(|e| e.contains("hyphens")).unwrap();
        let at = out.explanations.iter().position(|e| e.contains("@ symbol")).unwrap();
        let tld = out.explanations.iter().position(|e| e.contains("extension")).unwrap();
        assert!(https < hyphens && hyphens < at && at < tld);
    }

    #[test]
    fn test_clean_url_has_no_explanations() {
        let out = extract("https://docs.rs/serde");
        assert!(out.explanations.is_empty());
    }

    #[test]
    fn test_extract_checked_rejects_empty() {
        let extractor = UrlFeatureExtractor::new();
        assert!(matches!(extractor.extract_checked("   "), Err(ScoringError::InvalidInput(_))));
        assert!(extractor.extract_checked("example.com").is_ok());
    }
}
