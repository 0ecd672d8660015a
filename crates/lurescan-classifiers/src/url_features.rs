//! URL feature extraction
//!
//! Turns a raw link into a fixed set of structural, lexical and reputation
//! features. Extraction never fails: anything that cannot be parsed yields
//! [`UrlFeatures::malformed`], a signature that deliberately leans "fake".

use crate::text::{build_matcher, count_distinct_matches, is_special, ratio, shannon_entropy};
use aho_corasick::AhoCorasick;
use lurescan_core::{Domain, FeatureVector, Result};
use regex::Regex;
use std::borrow::Cow;
use std::net::IpAddr;

/// Keywords counted anywhere in the URL (shorteners, scam words, brands)
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "bit.ly", "tinyurl", "t.co", "goo.gl", "ow.ly", "short.link", "click", "verify", "update",
    "secure", "account", "suspended", "urgent", "confirm", "validate", "login", "password",
    "bank", "paypal", "amazon", "ebay", "microsoft", "apple", "facebook",
];

/// Top-level domains favoured by throwaway scam sites
pub const SUSPICIOUS_TLDS: &[&str] = &[".tk", ".ml", ".ga", ".cf", ".gq", ".xyz"];

/// URL shortening services, matched against the domain only
pub const SHORTENER_SERVICES: &[&str] = &[
    "bit.ly",
    "tinyurl.com",
    "t.co",
    "goo.gl",
    "ow.ly",
    "short.link",
    "tiny.cc",
];

/// Domains (and their subdomains) treated as known-legitimate
pub const LEGITIMATE_DOMAINS: &[&str] = &[
    "google.com",
    "meet.google.com",
    "docs.google.com",
    "drive.google.com",
    "gmail.com",
    "mail.google.com",
    "calendar.google.com",
    "maps.google.com",
    "facebook.com",
    "amazon.com",
    "microsoft.com",
    "apple.com",
    "github.com",
    "stackoverflow.com",
    "wikipedia.org",
    "youtube.com",
    "twitter.com",
    "linkedin.com",
    "instagram.com",
    "chatgpt.com",
    "openai.com",
    "reddit.com",
    "netflix.com",
    "spotify.com",
    "paypal.com",
    "ebay.com",
    "medium.com",
    "quora.com",
    "tumblr.com",
    "pinterest.com",
    "snapchat.com",
    "whatsapp.com",
    "telegram.org",
    "discord.com",
    "zoom.us",
    "slack.com",
    "dropbox.com",
    "onedrive.com",
];

/// Feature names, in model order
pub const URL_FEATURE_NAMES: &[&str] = &[
    "url_length",
    "domain_length",
    "path_length",
    "query_length",
    "has_https",
    "has_http",
    "subdomain_count",
    "has_ip",
    "has_port",
    "tld_length",
    "suspicious_tld",
    "suspicious_keyword_count",
    "has_click",
    "has_verify",
    "has_update",
    "has_account",
    "has_login",
    "special_char_count",
    "digit_count",
    "letter_count",
    "hyphen_count",
    "underscore_count",
    "dot_count",
    "slash_count",
    "equal_count",
    "question_mark_count",
    "ampersand_count",
    "url_entropy",
    "domain_entropy",
    "digit_ratio",
    "letter_ratio",
    "special_char_ratio",
    "is_short_url",
    "path_depth",
    "query_param_count",
    "is_known_legitimate",
];

/// Features extracted from one URL
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UrlFeatures {
    pub url_length: usize,
    pub domain_length: usize,
    pub path_length: usize,
    pub query_length: usize,
    pub has_https: bool,
    pub has_http: bool,
    pub subdomain_count: usize,
    pub has_ip: bool,
    pub has_port: bool,
    pub tld_length: usize,
    pub suspicious_tld: bool,
    pub suspicious_keyword_count: usize,
    pub has_click: bool,
    pub has_verify: bool,
    pub has_update: bool,
    pub has_account: bool,
    pub has_login: bool,
    pub special_char_count: usize,
    pub digit_count: usize,
    pub letter_count: usize,
    pub hyphen_count: usize,
    pub underscore_count: usize,
    pub dot_count: usize,
    pub slash_count: usize,
    pub equal_count: usize,
    pub question_mark_count: usize,
    pub ampersand_count: usize,
    pub url_entropy: f64,
    pub domain_entropy: f64,
    pub digit_ratio: f64,
    pub letter_ratio: f64,
    pub special_char_ratio: f64,
    pub is_short_url: bool,
    pub path_depth: usize,
    pub query_param_count: usize,
    pub is_known_legitimate: bool,
}

impl UrlFeatures {
    /// Fake-leaning signature used for empty or unparseable input
    pub fn malformed() -> Self {
        Self {
            suspicious_tld: true,
            suspicious_keyword_count: 5,
            has_click: true,
            has_verify: true,
            has_update: true,
            has_account: true,
            has_login: true,
            special_char_count: 10,
            url_entropy: 6.0,
            domain_entropy: 6.0,
            digit_ratio: 0.5,
            special_char_ratio: 0.5,
            ..Self::default()
        }
    }

    /// True if these features carry the malformed-input signature
    pub fn is_malformed(&self) -> bool {
        self.url_length == 0 && self.suspicious_keyword_count >= 5
    }

    /// Values in [`URL_FEATURE_NAMES`] order
    pub fn to_values(&self) -> Vec<f64> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        vec![
            self.url_length as f64,
            self.domain_length as f64,
            self.path_length as f64,
            self.query_length as f64,
            flag(self.has_https),
            flag(self.has_http),
            self.subdomain_count as f64,
            flag(self.has_ip),
            flag(self.has_port),
            self.tld_length as f64,
            flag(self.suspicious_tld),
            self.suspicious_keyword_count as f64,
            flag(self.has_click),
            flag(self.has_verify),
            flag(self.has_update),
            flag(self.has_account),
            flag(self.has_login),
            self.special_char_count as f64,
            self.digit_count as f64,
            self.letter_count as f64,
            self.hyphen_count as f64,
            self.underscore_count as f64,
            self.dot_count as f64,
            self.slash_count as f64,
            self.equal_count as f64,
            self.question_mark_count as f64,
            self.ampersand_count as f64,
            self.url_entropy,
            self.domain_entropy,
            self.digit_ratio,
            self.letter_ratio,
            self.special_char_ratio,
            flag(self.is_short_url),
            self.path_depth as f64,
            self.query_param_count as f64,
            flag(self.is_known_legitimate),
        ]
    }

    /// Named feature vector for the URL domain
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new(Domain::Url, URL_FEATURE_NAMES, self.to_values())
    }
}

/// Raw components of a URL, split the way a browser address bar reads them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UrlParts<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
    query: &'a str,
}

impl<'a> UrlParts<'a> {
    /// Split `scheme://authority/path?query#fragment`; None without scheme or authority
    fn split(url: &'a str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let (authority, rest) = rest.split_at(authority_end);
        if scheme.is_empty() || authority.is_empty() {
            return None;
        }

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Some(Self {
            scheme,
            authority,
            path,
            query,
        })
    }
}

/// Split a lowercased authority into host and optional port, dropping userinfo
fn split_host_port(authority: &str) -> (&str, Option<&str>) {
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    if let Some(bracketed) = host_port.strip_prefix('[') {
        return match bracketed.split_once(']') {
            Some((v6, tail)) => (v6, tail.strip_prefix(':')),
            None => (host_port, None),
        };
    }

    match host_port.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    }
}

/// True if `host` is `domain` itself or one of its subdomains
fn is_same_or_subdomain(host: &str, domain: &str) -> bool {
    host.strip_suffix(domain)
        .map_or(false, |prefix| prefix.is_empty() || prefix.ends_with('.'))
}

/// Stateless URL feature extractor; owns only its lookup tables
pub struct UrlFeatureExtractor {
    keywords: AhoCorasick,
    missing_slashes: Regex,
}

impl UrlFeatureExtractor {
    /// Create a new URL feature extractor
    pub fn new() -> Result<Self> {
        Ok(Self {
            keywords: build_matcher("URL keyword", SUSPICIOUS_KEYWORDS)?,
            missing_slashes: Regex::new(r"^https?/[^/]").map_err(|e| {
                lurescan_core::Error::model(format!("Failed to compile scheme regex: {}", e))
            })?,
        })
    }

    /// Extract features from `url`; never fails
    pub fn extract(&self, url: &str) -> UrlFeatures {
        // "https/example.com" instead of "https://example.com"
        if url.is_empty() || self.missing_slashes.is_match(url) {
            return UrlFeatures::malformed();
        }

        let url: Cow<'_, str> = if url.starts_with("http://") || url.starts_with("https://") {
            Cow::Borrowed(url)
        } else {
            Cow::Owned(format!("https://{}", url))
        };

        let Some(parts) = UrlParts::split(&url) else {
            return UrlFeatures::malformed();
        };

        self.extract_parts(&url, parts)
    }

    /// Extract features as a named vector
    pub fn extract_vector(&self, url: &str) -> FeatureVector {
        self.extract(url).to_vector()
    }

    /// Feature names, in model order
    pub fn feature_names(&self) -> &'static [&'static str] {
        URL_FEATURE_NAMES
    }

    fn extract_parts(&self, url: &str, parts: UrlParts<'_>) -> UrlFeatures {
        let domain = parts.authority.to_lowercase();
        let (host, port) = split_host_port(&domain);
        let url_lower = url.to_lowercase();

        let tld = host.rsplit_once('.').map(|(_, last)| last);
        let tld_length = tld.map_or(0, |t| t.chars().count() + 1);
        let suspicious_tld = tld.map_or(false, |t| {
            let dotted = format!(".{}", t);
            SUSPICIOUS_TLDS.iter().any(|s| dotted.ends_with(s))
        });

        let url_length = url.chars().count();
        let special_char_count = url.chars().filter(|&c| is_special(c)).count();
        let digit_count = url.chars().filter(char::is_ascii_digit).count();
        let letter_count = url.chars().filter(|c| c.is_alphabetic()).count();

        UrlFeatures {
            url_length,
            domain_length: parts.authority.chars().count(),
            path_length: parts.path.chars().count(),
            query_length: parts.query.chars().count(),
            has_https: parts.scheme == "https",
            has_http: parts.scheme == "http",
            subdomain_count: domain.matches('.').count(),
            has_ip: host.parse::<IpAddr>().is_ok(),
            has_port: port.is_some(),
            tld_length,
            suspicious_tld,
            suspicious_keyword_count: count_distinct_matches(&self.keywords, url),
            has_click: url_lower.contains("click"),
            has_verify: url_lower.contains("verify"),
            has_update: url_lower.contains("update"),
            has_account: url_lower.contains("account"),
            has_login: url_lower.contains("login"),
            special_char_count,
            digit_count,
            letter_count,
            hyphen_count: url.matches('-').count(),
            underscore_count: url.matches('_').count(),
            dot_count: url.matches('.').count(),
            slash_count: url.matches('/').count(),
            equal_count: url.matches('=').count(),
            question_mark_count: url.matches('?').count(),
            ampersand_count: url.matches('&').count(),
            url_entropy: shannon_entropy(url),
            domain_entropy: shannon_entropy(&domain),
            digit_ratio: ratio(digit_count, url_length),
            letter_ratio: ratio(letter_count, url_length),
            special_char_ratio: ratio(special_char_count, url_length),
            is_short_url: SHORTENER_SERVICES.iter().any(|s| domain.contains(s)),
            path_depth: if parts.path.is_empty() {
                0
            } else {
                parts.path.matches('/').count().saturating_sub(1)
            },
            query_param_count: if parts.query.is_empty() {
                0
            } else {
                parts.query.split('&').count()
            },
            is_known_legitimate: LEGITIMATE_DOMAINS
                .iter()
                .any(|d| is_same_or_subdomain(host, d)),
        }
    }
}

impl Default for UrlFeatureExtractor {
    fn default() -> Self {
        Self::new().expect("Failed to create URL feature extractor")
    }
}
