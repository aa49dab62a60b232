//! Shared types for verification requests, results, and classification outcomes.

use serde::{Deserialize, Serialize};

/// A text to classify, tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateText {
    /// The text itself
    pub text: String,
    /// Provenance label (muscle name, dataset entry title, ...)
    pub source: String,
}

impl CandidateText {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

impl From<&str> for CandidateText {
    fn from(text: &str) -> Self {
        Self::new(text, "")
    }
}

/// Body sent to the verification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    /// Topical context the claim is judged against
    pub document: String,
    /// Assertion to check
    pub claim: String,
}

impl VerificationRequest {
    pub fn new(document: impl Into<String>, claim: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            claim: claim.into(),
        }
    }
}

/// Parsed reply from a successful attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the endpoint considers the claim supported
    pub supported: bool,
    /// Endpoint confidence in [0, 1]
    pub confidence: f64,
}

impl Verdict {
    pub fn new(supported: bool, confidence: f64) -> Self {
        Self {
            supported,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Final result of a retry-governed verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Whether the claim was supported
    pub supported: bool,
    /// Endpoint confidence, 0.0 on failure
    pub confidence: f64,
    /// Last error message once attempts are exhausted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    /// Result carrying a verdict from the endpoint.
    pub fn success(verdict: Verdict) -> Self {
        Self {
            supported: verdict.supported,
            confidence: verdict.confidence,
            error: None,
        }
    }

    /// Failure sentinel after exhausted attempts.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            supported: false,
            confidence: 0.0,
            error: Some(error.into()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Which decision rule produced a relevance verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationLabel {
    /// Keyword present, endpoint not decisive
    KeywordBased,
    /// Keyword present, endpoint decisive, context patterns consulted
    HighConfidenceWithContext,
    /// No keyword, endpoint decisive
    ApiBased,
    /// No keyword, endpoint not decisive, general patterns consulted
    ContextBased,
    /// Verification failed
    Error,
}

impl ClassificationLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KeywordBased => "keyword_based",
            Self::HighConfidenceWithContext => "high_confidence_with_context",
            Self::ApiBased => "api_based",
            Self::ContextBased => "context_based",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full record of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub text: String,
    pub is_relevant: bool,
    pub confidence: f64,
    pub classification_label: ClassificationLabel,
    pub api_supported: bool,
    /// Matched keywords, in canonical keyword-list order
    pub matched_keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClassificationOutcome {
    pub fn has_keyword(&self) -> bool {
        !self.matched_keywords.is_empty()
    }
}
