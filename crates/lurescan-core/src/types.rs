//! Core types for LureScan

use crate::error::Error;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the two classification tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Links and bare domains
    Url,
    /// Free-text messages (SMS, email bodies, chat)
    Message,
}

impl Domain {
    /// All domains, in a stable order
    pub const ALL: [Domain; 2] = [Domain::Url, Domain::Message];

    /// Stable lowercase key, used for artifact names and metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "url" | "link" => Ok(Self::Url),
            "message" | "msg" => Ok(Self::Message),
            _ => Err(Error::UnknownDomain(s.to_string())),
        }
    }
}

/// Binary classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Class 0
    Legitimate,
    /// Class 1 (phishing / scam)
    Fake,
}

impl Label {
    /// Map a class index (0 or 1) to a label; anything non-zero is fake
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            Self::Legitimate
        } else {
            Self::Fake
        }
    }

    /// Class index used by the models
    pub fn index(&self) -> usize {
        match self {
            Self::Legitimate => 0,
            Self::Fake => 1,
        }
    }

    /// Lowercase name, used for metric labels
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legitimate => "legitimate",
            Self::Fake => "fake",
        }
    }

    /// Uppercase name used in human-readable output
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Legitimate => "LEGITIMATE",
            Self::Fake => "FAKE",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-order numeric encoding of one input
///
/// Field names and order are fixed per domain and must match the order the
/// models were trained with.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    domain: Domain,
    names: &'static [&'static str],
    values: Vec<f64>,
}

impl FeatureVector {
    /// Create a feature vector; `names` and `values` must have equal length
    pub fn new(domain: Domain, names: &'static [&'static str], values: Vec<f64>) -> Self {
        assert_eq!(
            names.len(),
            values.len(),
            "feature schema for {} has {} names but {} values",
            domain,
            names.len(),
            values.len()
        );
        Self {
            domain,
            names,
            values,
        }
    }

    /// Domain this vector belongs to
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Feature names in order
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// Feature values in order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the schema is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// Iterate over `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }

    /// Consume the vector, returning the raw values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

/// Outcome of a single detection call
#[derive(Debug, Clone, Serialize)]
pub struct DetectionResult {
    /// Domain the input was classified in
    pub domain: Domain,

    /// The original input, echoed back
    pub input: String,

    /// Predicted label
    pub label: Label,

    /// Probability mass of the predicted class (0.0-1.0)
    pub confidence: f64,

    /// Ordered human-readable justifications; the first states the verdict
    pub reasons: Vec<String>,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl DetectionResult {
    /// Result returned when no trained model is available for the domain
    pub fn untrained(domain: Domain, input: impl Into<String>) -> Self {
        Self {
            domain,
            input: input.into(),
            label: Label::Legitimate,
            confidence: 0.0,
            reasons: vec!["Model not trained. Please train the model first.".to_string()],
            latency_us: 0,
        }
    }

    /// True if the input was classified as fake
    pub fn is_fake(&self) -> bool {
        self.label == Label::Fake
    }
}
