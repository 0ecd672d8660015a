//! Character-level helpers shared by the feature extractors

use aho_corasick::AhoCorasick;
use lurescan_core::{Error, Result};
use std::collections::BTreeMap;

/// Characters counted as "special" by both extractors
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// True if `c` belongs to [`SPECIAL_CHARS`]
pub fn is_special(c: char) -> bool {
    SPECIAL_CHARS.contains(c)
}

/// Shannon entropy (bits) over the character frequencies of `text`
///
/// Returns 0.0 for an empty string. Terms are summed in character order so
/// the result is bit-for-bit reproducible.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Build a case-insensitive keyword matcher
pub fn build_matcher(name: &str, patterns: &[&str]) -> Result<AhoCorasick> {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(patterns)
        .map_err(|e| Error::model(format!("Failed to build {} matcher: {}", name, e)))
}

/// Number of distinct patterns occurring anywhere in `text`
///
/// Each pattern counts at most once, however often it occurs, and
/// overlapping occurrences are all considered ("t.co" inside "bit.co").
pub fn count_distinct_matches(matcher: &AhoCorasick, text: &str) -> usize {
    let mut seen = vec![false; matcher.patterns_len()];
    let mut distinct = 0;
    for m in matcher.find_overlapping_iter(text) {
        let slot = &mut seen[m.pattern().as_usize()];
        if !*slot {
            *slot = true;
            distinct += 1;
        }
    }
    distinct
}

/// `numerator / denominator`, or 0.0 when the denominator is zero
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Count runs of one character repeated three or more times ("freeee")
///
/// Newlines never form a run.
pub fn count_repeated_runs(text: &str) -> usize {
    let mut runs = 0;
    let mut prev: Option<char> = None;
    let mut run_len = 0usize;

    for c in text.chars() {
        if Some(c) == prev && c != '\n' {
            run_len += 1;
            if run_len == 3 {
                runs += 1;
            }
        } else {
            prev = Some(c);
            run_len = 1;
        }
    }
    runs
}
