//! Human-readable justifications for a verdict
//!
//! Reasons are derived from the raw (unscaled) features. The first line
//! always states the verdict and confidence; the rest come from rule tables
//! evaluated in order, one table per domain and verdict.

use crate::message_features::MessageFeatures;
use crate::url_features::UrlFeatures;
use lurescan_core::Label;

/// Sole reason returned for input that could not be parsed as a URL
pub const MALFORMED_URL_REASON: &str =
    "[ERROR] Invalid or malformed URL format detected. Please check the URL and try again.";

/// A condition on extracted features and the line it produces
struct ReasonRule<F> {
    applies: fn(&F) -> bool,
    render: Render<F>,
}

enum Render<F> {
    Text(&'static str),
    Format(fn(&F) -> String),
}

static URL_FAKE_RULES: &[ReasonRule<UrlFeatures>] = &[
    ReasonRule {
        applies: |f| f.is_short_url,
        render: Render::Text(
            "[WARNING] Contains a URL shortener (bit.ly, tinyurl, etc.) which can hide malicious destinations.",
        ),
    },
    ReasonRule {
        applies: |f| f.suspicious_tld,
        render: Render::Text(
            "[WARNING] Uses a suspicious top-level domain (.tk, .ml, .ga, etc.) commonly used for scams.",
        ),
    },
    ReasonRule {
        applies: |f| f.has_ip,
        render: Render::Text(
            "[WARNING] Uses an IP address instead of a domain name, which is unusual and suspicious.",
        ),
    },
    ReasonRule {
        applies: |f| f.suspicious_keyword_count >= 3,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Contains {} suspicious keywords (verify, click, account, etc.).",
                f.suspicious_keyword_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.url_length > 150,
        render: Render::Text(
            "[WARNING] URL is unusually long, which may indicate obfuscation or tracking parameters.",
        ),
    },
    ReasonRule {
        applies: |f| f.url_entropy > 5.0,
        render: Render::Text(
            "[WARNING] High URL entropy suggests random/obfuscated characters, common in phishing URLs.",
        ),
    },
    ReasonRule {
        applies: |f| !f.has_https,
        render: Render::Text(
            "[WARNING] Does not use HTTPS encryption, which is a security risk.",
        ),
    },
    ReasonRule {
        applies: |f| f.special_char_ratio > 0.15,
        render: Render::Text(
            "[WARNING] High number of special characters, which may indicate URL manipulation.",
        ),
    },
    ReasonRule {
        applies: |f| !f.is_known_legitimate && f.domain_length < 5,
        render: Render::Text(
            "[WARNING] Domain name is very short and not from a known legitimate source.",
        ),
    },
];

static URL_LEGITIMATE_RULES: &[ReasonRule<UrlFeatures>] = &[
    ReasonRule {
        applies: |f| f.has_https,
        render: Render::Text(
            "[OK] Uses HTTPS encryption for secure communication.",
        ),
    },
    ReasonRule {
        applies: |f| f.is_known_legitimate,
        render: Render::Text(
            "[OK] Domain is from a known legitimate source.",
        ),
    },
    ReasonRule {
        applies: |f| f.suspicious_keyword_count == 0,
        render: Render::Text(
            "[OK] No suspicious keywords detected.",
        ),
    },
    ReasonRule {
        applies: |f| !f.suspicious_tld,
        render: Render::Text(
            "[OK] Uses a standard, reputable top-level domain.",
        ),
    },
];

static MESSAGE_FAKE_RULES: &[ReasonRule<MessageFeatures>] = &[
    ReasonRule {
        applies: |f| f.has_suspicious_phrase,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Contains {} suspicious phrase(s) like 'click here', 'act now', 'verify account'.",
                f.suspicious_phrase_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.has_urgency,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Uses urgency language ({} urgency words) to pressure quick action.",
                f.urgency_word_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.has_financial_keywords,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Contains {} financial-related keywords, common in payment scams.",
                f.financial_keyword_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.has_authority_keywords,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Mentions authority figures ({} mentions), common in impersonation scams.",
                f.authority_keyword_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.url_count > 0,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Contains {} URL(s) - be cautious of links in unsolicited messages.",
                f.url_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.all_caps_ratio > 0.3,
        render: Render::Text(
            "[WARNING] Excessive use of capital letters, a common spam/scam tactic.",
        ),
    },
    ReasonRule {
        applies: |f| f.exclamation_count >= 3,
        render: Render::Format(|f| {
            format!(
                "[WARNING] Contains {} exclamation marks, indicating aggressive/pushy language.",
                f.exclamation_count
            )
        }),
    },
    ReasonRule {
        applies: |f| f.suspicious_to_word_ratio > 0.1,
        render: Render::Text(
            "[WARNING] High ratio of suspicious phrases to total words.",
        ),
    },
    ReasonRule {
        applies: |f| f.max_word_repetition >= 3,
        render: Render::Text(
            "[WARNING] Contains repeated words, a common spam pattern.",
        ),
    },
];

static MESSAGE_LEGITIMATE_RULES: &[ReasonRule<MessageFeatures>] = &[
    ReasonRule {
        applies: |f| !f.has_suspicious_phrase,
        render: Render::Text(
            "[OK] No suspicious phrases detected.",
        ),
    },
    ReasonRule {
        applies: |f| !f.has_urgency,
        render: Render::Text(
            "[OK] No urgency language detected.",
        ),
    },
    ReasonRule {
        applies: |f| f.url_count == 0,
        render: Render::Text(
            "[OK] No embedded URLs detected.",
        ),
    },
    ReasonRule {
        applies: |f| f.all_caps_ratio < 0.1,
        render: Render::Text(
            "[OK] Normal capitalization pattern.",
        ),
    },
];

/// Verdict line, e.g. `Detected as FAKE with 97.3% confidence.`
pub fn verdict_line(label: Label, confidence: f64) -> String {
    format!(
        "Detected as {} with {:.1}% confidence.",
        label.display_name(),
        confidence * 100.0
    )
}

fn apply<F>(rules: &[ReasonRule<F>], features: &F, label: Label, confidence: f64) -> Vec<String> {
    std::iter::once(verdict_line(label, confidence))
        .chain(
            rules
                .iter()
                .filter(|r| (r.applies)(features))
                .map(|r| match r.render {
                    Render::Text(text) => text.to_string(),
                    Render::Format(render) => render(features),
                }),
        )
        .collect()
}

/// Reasons for a URL verdict
pub fn url_reasons(features: &UrlFeatures, label: Label, confidence: f64) -> Vec<String> {
    if features.is_malformed() {
        return vec![MALFORMED_URL_REASON.to_string()];
    }
    let rules = match label {
        Label::Fake => URL_FAKE_RULES,
        Label::Legitimate => URL_LEGITIMATE_RULES,
    };
    apply(rules, features, label, confidence)
}

/// Reasons for a message verdict
pub fn message_reasons(features: &MessageFeatures, label: Label, confidence: f64) -> Vec<String> {
    let rules = match label {
        Label::Fake => MESSAGE_FAKE_RULES,
        Label::Legitimate => MESSAGE_LEGITIMATE_RULES,
    };
    apply(rules, features, label, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_features::MessageFeatureExtractor;
    use crate::url_features::UrlFeatureExtractor;

    #[test]
    fn test_verdict_line_format() {
        assert_eq!(
            verdict_line(Label::Fake, 0.973),
            "Detected as FAKE with 97.3% confidence."
        );
        assert_eq!(
            verdict_line(Label::Legitimate, 1.0),
            "Detected as LEGITIMATE with 100.0% confidence."
        );
    }

    #[test]
    fn test_malformed_url_has_single_reason() {
        let reasons = url_reasons(&UrlFeatures::malformed(), Label::Fake, 0.9);
        assert_eq!(reasons, vec![MALFORMED_URL_REASON.to_string()]);
    }

    #[test]
    fn test_fake_url_reasons() {
        let features = UrlFeatureExtractor::new()
            .unwrap()
            .extract("http://bit.ly/verify-now");
        let reasons = url_reasons(&features, Label::Fake, 0.8);

        assert_eq!(reasons[0], "Detected as FAKE with 80.0% confidence.");
        assert!(reasons.iter().any(|r| r.contains("URL shortener")));
        assert!(reasons.iter().any(|r| r.contains("Does not use HTTPS")));
        assert!(!reasons.iter().any(|r| r.starts_with("[OK]")));
    }

    #[test]
    fn test_legitimate_url_reasons() {
        let features = UrlFeatureExtractor::new()
            .unwrap()
            .extract("https://www.google.com");
        let reasons = url_reasons(&features, Label::Legitimate, 0.95);

        assert_eq!(reasons[0], "Detected as LEGITIMATE with 95.0% confidence.");
        assert!(reasons.contains(&"[OK] Uses HTTPS encryption for secure communication.".to_string()));
        assert!(reasons.contains(&"[OK] Domain is from a known legitimate source.".to_string()));
        assert!(!reasons.iter().any(|r| r.starts_with("[WARNING]")));
    }

    #[test]
    fn test_message_reasons_follow_verdict() {
        let extractor = MessageFeatureExtractor::new().unwrap();
        let features = extractor.extract("URGENT!!! Click here to verify your bank account now!");
        let fake = message_reasons(&features, Label::Fake, 0.91);
        assert!(fake[0].starts_with("Detected as FAKE with"));
        assert!(fake.iter().any(|r| r.contains("urgency language")));
        assert!(fake.iter().any(|r| r.contains("exclamation marks")));

        let calm = extractor.extract("See you at lunch tomorrow.");
        let legit = message_reasons(&calm, Label::Legitimate, 0.7);
        assert_eq!(
            legit,
            vec![
                "Detected as LEGITIMATE with 70.0% confidence.".to_string(),
                "[OK] No suspicious phrases detected.".to_string(),
                "[OK] No urgency language detected.".to_string(),
                "[OK] No embedded URLs detected.".to_string(),
                "[OK] Normal capitalization pattern.".to_string(),
            ]
        );
    }
}
