//! Message feature extraction
//!
//! Lexical, phrase, contact-pattern and repetition features for free text.
//! An empty message yields the all-zero vector; unlike URLs there is no
//! fake-leaning default.

use crate::text::{
    build_matcher, count_distinct_matches, count_repeated_runs, is_special, ratio,
    shannon_entropy,
};
use aho_corasick::AhoCorasick;
use lurescan_core::{Domain, Error, FeatureVector, Result};
use regex::Regex;
use std::collections::HashMap;

/// Phrases typical of phishing and prize scams
pub const SUSPICIOUS_PHRASES: &[&str] = &[
    "click here",
    "act now",
    "limited time",
    "urgent",
    "verify",
    "suspended",
    "locked",
    "expired",
    "confirm",
    "update now",
    "congratulations",
    "you won",
    "free money",
    "claim now",
    "click below",
    "verify account",
    "update payment",
    "security alert",
];

/// Words that pressure the reader to act immediately
pub const URGENCY_WORDS: &[&str] = &[
    "urgent",
    "immediate",
    "asap",
    "now",
    "today",
    "expires",
    "limited",
    "hurry",
    "act fast",
    "deadline",
];

/// Payment and money-transfer vocabulary
pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "bank",
    "account",
    "payment",
    "credit card",
    "debit",
    "transfer",
    "refund",
    "invoice",
    "billing",
    "paypal",
    "bitcoin",
    "crypto",
    "investment",
    "profit",
];

/// Institutions commonly impersonated
pub const AUTHORITY_KEYWORDS: &[&str] = &[
    "irs",
    "fbi",
    "police",
    "court",
    "government",
    "official",
    "legal",
    "warrant",
    "arrest",
    "lawsuit",
];

/// Feature names, in model order
pub const MESSAGE_FEATURE_NAMES: &[&str] = &[
    "message_length",
    "word_count",
    "char_count",
    "sentence_count",
    "avg_word_length",
    "uppercase_count",
    "lowercase_count",
    "digit_count",
    "special_char_count",
    "exclamation_count",
    "question_mark_count",
    "all_caps_ratio",
    "url_count",
    "has_url",
    "suspicious_phrase_count",
    "has_suspicious_phrase",
    "suspicious_phrase_weight",
    "urgency_word_count",
    "has_urgency",
    "urgency_weight",
    "financial_keyword_count",
    "has_financial_keywords",
    "authority_keyword_count",
    "has_authority_keywords",
    "entropy",
    "punctuation_density",
    "max_word_repetition",
    "unique_word_ratio",
    "email_count",
    "phone_count",
    "typo_indicators",
    "url_to_word_ratio",
    "suspicious_to_word_ratio",
];

/// Features extracted from one message
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageFeatures {
    pub message_length: usize,
    pub word_count: usize,
    pub char_count: usize,
    pub sentence_count: usize,
    pub avg_word_length: f64,
    pub uppercase_count: usize,
    pub lowercase_count: usize,
    pub digit_count: usize,
    pub special_char_count: usize,
    pub exclamation_count: usize,
    pub question_mark_count: usize,
    pub all_caps_ratio: f64,
    pub url_count: usize,
    pub has_url: bool,
    pub suspicious_phrase_count: usize,
    pub has_suspicious_phrase: bool,
    pub suspicious_phrase_weight: f64,
    pub urgency_word_count: usize,
    pub has_urgency: bool,
    pub urgency_weight: f64,
    pub financial_keyword_count: usize,
    pub has_financial_keywords: bool,
    pub authority_keyword_count: usize,
    pub has_authority_keywords: bool,
    pub entropy: f64,
    pub punctuation_density: f64,
    pub max_word_repetition: usize,
    pub unique_word_ratio: f64,
    pub email_count: usize,
    pub phone_count: usize,
    pub typo_indicators: usize,
    pub url_to_word_ratio: f64,
    pub suspicious_to_word_ratio: f64,
}

impl MessageFeatures {
    /// Values in [`MESSAGE_FEATURE_NAMES`] order
    pub fn to_values(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        vec![
            self.message_length as f64,
            self.word_count as f64,
            self.char_count as f64,
            self.sentence_count as f64,
            self.avg_word_length,
            self.uppercase_count as f64,
            self.lowercase_count as f64,
            self.digit_count as f64,
            self.special_char_count as f64,
            self.exclamation_count as f64,
            self.question_mark_count as f64,
            self.all_caps_ratio,
            self.url_count as f64,
            flag(self.has_url),
            self.suspicious_phrase_count as f64,
            flag(self.has_suspicious_phrase),
            self.suspicious_phrase_weight,
            self.urgency_word_count as f64,
            flag(self.has_urgency),
            self.urgency_weight,
            self.financial_keyword_count as f64,
            flag(self.has_financial_keywords),
            self.authority_keyword_count as f64,
            flag(self.has_authority_keywords),
            self.entropy,
            self.punctuation_density,
            self.max_word_repetition as f64,
            self.unique_word_ratio,
            self.email_count as f64,
            self.phone_count as f64,
            self.typo_indicators as f64,
            self.url_to_word_ratio,
            self.suspicious_to_word_ratio,
        ]
    }

    /// Named feature vector for the message domain
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new(Domain::Message, MESSAGE_FEATURE_NAMES, self.to_values())
    }
}

/// Stateless message feature extractor; owns only its lookup tables
pub struct MessageFeatureExtractor {
    suspicious_phrases: AhoCorasick,
    urgency_words: AhoCorasick,
    financial_keywords: AhoCorasick,
    authority_keywords: AhoCorasick,
    url_regex: Regex,
    email_regex: Regex,
    phone_regex: Regex,
    sentence_regex: Regex,
}

impl MessageFeatureExtractor {
    /// Create a new message feature extractor
    pub fn new() -> Result<Self> {
        let compile = |name: &str, pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                Error::model(format!("Failed to compile {} regex: {}", name, e))
            })
        };

        Ok(Self {
            suspicious_phrases: build_matcher("suspicious phrase", SUSPICIOUS_PHRASES)?,
            urgency_words: build_matcher("urgency", URGENCY_WORDS)?,
            financial_keywords: build_matcher("financial", FINANCIAL_KEYWORDS)?,
            authority_keywords: build_matcher("authority", AUTHORITY_KEYWORDS)?,
            url_regex: compile(
                "URL",
                r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+",
            )?,
            email_regex: compile(
                "email",
                r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
            )?,
            phone_regex: compile("phone", r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b")?,
            sentence_regex: compile("sentence", r"[.!?]+")?,
        })
    }

    /// Extract features from `message`; never fails
    pub fn extract(&self, message: &str) -> MessageFeatures {
        if message.is_empty() {
            return MessageFeatures::default();
        }

        let message_length = message.chars().count();
        let words: Vec<&str> = message.split_whitespace().collect();
        let word_count = words.len();
        let total_word_chars: usize = words.iter().map(|w| w.chars().count()).sum();

        let uppercase_count = message.chars().filter(|c| c.is_uppercase()).count();
        let special_char_count = message.chars().filter(|&c| is_special(c)).count();
        let url_count = self.url_regex.find_iter(message).count();

        let suspicious_phrase_count = count_distinct_matches(&self.suspicious_phrases, message);
        let urgency_word_count = count_distinct_matches(&self.urgency_words, message);
        let financial_keyword_count = count_distinct_matches(&self.financial_keywords, message);
        let authority_keyword_count = count_distinct_matches(&self.authority_keywords, message);

        let lowered = message.to_lowercase();
        let (max_word_repetition, unique_word_ratio) = repetition(&lowered);

        MessageFeatures {
            message_length,
            word_count,
            char_count: message.chars().filter(|&c| c != ' ').count(),
            sentence_count: self.sentence_regex.split(message).count(),
            avg_word_length: total_word_chars as f64 / word_count.max(1) as f64,
            uppercase_count,
            lowercase_count: message.chars().filter(|c| c.is_lowercase()).count(),
            digit_count: message.chars().filter(char::is_ascii_digit).count(),
            special_char_count,
            exclamation_count: message.matches('!').count(),
            question_mark_count: message.matches('?').count(),
            all_caps_ratio: ratio(uppercase_count, message_length),
            url_count,
            has_url: url_count > 0,
            suspicious_phrase_count,
            has_suspicious_phrase: suspicious_phrase_count > 0,
            suspicious_phrase_weight: (suspicious_phrase_count as f64 * 0.5).min(3.0),
            urgency_word_count,
            has_urgency: urgency_word_count > 0,
            urgency_weight: (urgency_word_count as f64 * 0.3).min(2.0),
            financial_keyword_count,
            has_financial_keywords: financial_keyword_count > 0,
            authority_keyword_count,
            has_authority_keywords: authority_keyword_count > 0,
            entropy: shannon_entropy(message),
            punctuation_density: ratio(special_char_count, message_length),
            max_word_repetition,
            unique_word_ratio,
            email_count: self.email_regex.find_iter(message).count(),
            phone_count: self.phone_regex.find_iter(message).count(),
            typo_indicators: count_repeated_runs(message),
            url_to_word_ratio: ratio(url_count, word_count),
            suspicious_to_word_ratio: ratio(suspicious_phrase_count, word_count),
        }
    }

    /// Extract features as a named vector
    pub fn extract_vector(&self, message: &str) -> FeatureVector {
        self.extract(message).to_vector()
    }

    /// Feature names, in model order
    pub fn feature_names(&self) -> &'static [&'static str] {
        MESSAGE_FEATURE_NAMES
    }
}

impl Default for MessageFeatureExtractor {
    fn default() -> Self {
        Self::new().expect("Failed to create message feature extractor")
    }
}

/// Highest single-token frequency and distinct/total token ratio
fn repetition(lowered: &str) -> (usize, f64) {
    let mut freq: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for token in lowered.split_whitespace() {
        *freq.entry(token).or_insert(0) += 1;
        total += 1;
    }
    let max = freq.values().copied().max().unwrap_or(0);
    (max, ratio(freq.len(), total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(message: &str) -> MessageFeatures {
        MessageFeatureExtractor::new().unwrap().extract(message)
    }

    #[test]
    fn test_schema_matches_values() {
        assert_eq!(MESSAGE_FEATURE_NAMES.len(), 33);
        assert_eq!(
            MessageFeatures::default().to_values().len(),
            MESSAGE_FEATURE_NAMES.len()
        );
    }

    #[test]
    fn test_empty_message_is_all_zero() {
        let features = extract("");
        assert_eq!(features, MessageFeatures::default());
        assert!(features.to_values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_urgent_scam_message() {
        let features = extract("URGENT! Click here NOW to verify!");
        assert_eq!(features.exclamation_count, 2);
        // "click here", "urgent", "verify"
        assert_eq!(features.suspicious_phrase_count, 3);
        assert!(features.has_suspicious_phrase);
        assert_eq!(features.suspicious_phrase_weight, 1.5);
        // "urgent", "now"
        assert_eq!(features.urgency_word_count, 2);
        assert!((features.urgency_weight - 0.6).abs() < 1e-12);
        assert_eq!(features.word_count, 6);
        assert!(features.all_caps_ratio > 0.3);
    }

    #[test]
    fn test_weights_are_clipped() {
        let features = extract(
            "urgent verify suspended locked expired confirm congratulations you won \
             immediate asap now today expires limited hurry deadline",
        );
        assert_eq!(features.suspicious_phrase_weight, 3.0);
        assert_eq!(features.urgency_weight, 2.0);
    }

    #[test]
    fn test_embedded_urls_and_contacts() {
        let features = extract(
            "Verify at https://bank-verify.cf/login or mail help@bank-verify.cf, call 555-123-4567",
        );
        assert_eq!(features.url_count, 1);
        assert!(features.has_url);
        assert_eq!(features.email_count, 1);
        assert_eq!(features.phone_count, 1);
        assert!(features.has_financial_keywords);
    }

    #[test]
    fn test_authority_keywords() {
        let features = extract("The police have issued a warrant for your arrest.");
        assert_eq!(features.authority_keyword_count, 3);
        assert!(features.has_authority_keywords);
    }

    #[test]
    fn test_sentence_count_includes_trailing_piece() {
        assert_eq!(extract("Hello. How are you?").sentence_count, 3);
        assert_eq!(extract("no punctuation").sentence_count, 1);
    }

    #[test]
    fn test_repetition_features() {
        let features = extract("win win WIN now");
        assert_eq!(features.max_word_repetition, 3);
        assert_eq!(features.unique_word_ratio, 0.5);
    }

    #[test]
    fn test_whitespace_only_message() {
        let features = extract("   ");
        assert_eq!(features.word_count, 0);
        assert_eq!(features.unique_word_ratio, 0.0);
        assert_eq!(features.url_to_word_ratio, 0.0);
        assert_eq!(features.avg_word_length, 0.0);
    }

    #[test]
    fn test_typo_indicators() {
        assert_eq!(extract("freeee moneyyy").typo_indicators, 2);
    }
}
