//! Relevance decision policy.
//!
//! Combines three signals into a verdict and a label recording which rule
//! fired:
//!
//! | keyword | confidence | verdict | label |
//! |---|---|---|---|
//! | yes | `< threshold` | relevant | `keyword_based` |
//! | yes | `>= threshold` | keyword-context patterns | `high_confidence_with_context` |
//! | no  | `>= threshold` | endpoint `supported` | `api_based` |
//! | no  | `< threshold` | general-context patterns | `context_based` |
//!
//! Keyword evidence wins unless the verifier is very confident, and even then
//! the text must still pair a topic term with an effect term. Without keywords
//! the verifier decides when it is decisive and local patterns decide otherwise.
//!
//! The keyword list and both pattern sets are plain data and can be swapped
//! through the builder methods on [`RelevancePolicy`].

mod keywords;
mod patterns;
#[cfg(test)]
mod proptest;

pub use keywords::{KeywordSet, STRETCHING_KEYWORDS};
pub use patterns::{PatternSet, GENERAL_CONTEXT_PATTERNS, KEYWORD_CONTEXT_PATTERNS};

use serde::{Deserialize, Serialize};

use crate::types::{ClassificationLabel, ClassificationOutcome, VerificationResult};

/// Confidence at or above which the verifier is treated as decisive.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.95;

/// Verdict plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub is_relevant: bool,
    pub label: ClassificationLabel,
}

/// Keyword + confidence + context-pattern decision table.
#[derive(Debug, Clone)]
pub struct RelevancePolicy {
    keywords: KeywordSet,
    keyword_context: PatternSet,
    general_context: PatternSet,
    confidence_threshold: f64,
}

impl Default for RelevancePolicy {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::default(),
            keyword_context: PatternSet::keyword_context(),
            general_context: PatternSet::general_context(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl RelevancePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords(mut self, keywords: KeywordSet) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_keyword_context(mut self, patterns: PatternSet) -> Self {
        self.keyword_context = patterns;
        self
    }

    pub fn with_general_context(mut self, patterns: PatternSet) -> Self {
        self.general_context = patterns;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Keywords present in `text`, in canonical order.
    pub fn matched_keywords(&self, text: &str) -> Vec<String> {
        self.keywords
            .matches(text)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Topic/effect proximity check used when a keyword is present.
    pub fn keyword_context_matches(&self, text: &str) -> bool {
        self.keyword_context.is_match(text)
    }

    /// Broad relevance check used when no keyword is present.
    pub fn general_context_matches(&self, text: &str) -> bool {
        self.general_context.is_match(text)
    }

    /// Apply the decision table.
    pub fn decide(
        &self,
        text: &str,
        has_keyword: bool,
        api_supported: bool,
        confidence: f64,
    ) -> Decision {
        let decisive = confidence >= self.confidence_threshold;
        match (has_keyword, decisive) {
            (true, false) => Decision {
                is_relevant: true,
                label: ClassificationLabel::KeywordBased,
            },
            (true, true) => Decision {
                is_relevant: self.keyword_context_matches(text),
                label: ClassificationLabel::HighConfidenceWithContext,
            },
            (false, true) => Decision {
                is_relevant: api_supported,
                label: ClassificationLabel::ApiBased,
            },
            (false, false) => Decision {
                is_relevant: self.general_context_matches(text),
                label: ClassificationLabel::ContextBased,
            },
        }
    }

    /// Turn a verification result for `text` into a full outcome record.
    ///
    /// A failed verification yields an `error` outcome that is never relevant.
    pub fn outcome(&self, text: &str, result: &VerificationResult) -> ClassificationOutcome {
        let matched_keywords = self.matched_keywords(text);

        if let Some(error) = &result.error {
            return ClassificationOutcome {
                text: text.to_string(),
                is_relevant: false,
                confidence: 0.0,
                classification_label: ClassificationLabel::Error,
                api_supported: false,
                matched_keywords,
                error: Some(error.clone()),
            };
        }

        let decision = self.decide(
            text,
            !matched_keywords.is_empty(),
            result.supported,
            result.confidence,
        );
        ClassificationOutcome {
            text: text.to_string(),
            is_relevant: decision.is_relevant,
            confidence: result.confidence,
            classification_label: decision.label,
            api_supported: result.supported,
            matched_keywords,
            error: None,
        }
    }
}
