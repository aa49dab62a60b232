//! Context-pattern sets used as a lightweight relevance proxy.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Topic term near an outcome term, consulted when a keyword is present
/// and the verifier is very confident.
pub const KEYWORD_CONTEXT_PATTERNS: &[&str] = &[
    r"(스트레칭|stretching).*(효과|영향|방법|프로그램)",
    r"(근육|muscle).*(신장|늘리기|flexibility)",
    r"(운동|exercise).*(스트레칭|stretching)",
    r"(유연성|flexibility).*(향상|개선|증가)",
    r"(mobility|가동성).*(exercise|운동)",
    r"(rehabilitation|재활).*(program|프로그램)",
];

/// Broader relevance patterns, consulted when no keyword is present and the
/// verifier is not decisive.
pub const GENERAL_CONTEXT_PATTERNS: &[&str] = &[
    r"(flexibility|유연성).*(improvement|향상|증가)",
    r"(mobility|가동성).*(exercise|운동)",
    r"(rehabilitation|재활).*(program|프로그램)",
    r"(muscle|근육).*(elongation|신장|늘리기)",
    r"(joint|관절).*(range|가동|움직임)",
    r"(posture|자세).*(correction|교정|개선)",
];

static KEYWORD_CONTEXT: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::new(KEYWORD_CONTEXT_PATTERNS.iter().copied()).expect("invalid regex")
});

static GENERAL_CONTEXT: LazyLock<PatternSet> = LazyLock::new(|| {
    PatternSet::new(GENERAL_CONTEXT_PATTERNS.iter().copied()).expect("invalid regex")
});

/// Ordered, case-insensitive regex set with any-match semantics.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compile `patterns` case-insensitively.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let source = p.as_ref();
                RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| Error::config(format!("invalid pattern `{}`: {}", source, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Patterns pairing a topic term with an effect term.
    pub fn keyword_context() -> Self {
        KEYWORD_CONTEXT.clone()
    }

    /// Broader relevance patterns.
    pub fn general_context() -> Self {
        GENERAL_CONTEXT.clone()
    }

    /// True if any pattern matches anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Index of the first matching pattern, in set order.
    pub fn first_match(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|p| p.is_match(text))
    }

    pub fn sources(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
