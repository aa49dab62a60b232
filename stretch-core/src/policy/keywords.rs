//! Multilingual keyword list for the keyword-presence signal.

use regex::{Regex, RegexBuilder};

/// Canonical stretching keywords, Korean and English.
pub const STRETCHING_KEYWORDS: &[&str] = &[
    "스트레칭",
    "stretching",
    "신장",
    "유연성",
    "가동성",
    "flexibility",
    "mobility",
    "근육",
    "관절",
    "자세",
    "신전",
    "이완",
    "신장성",
    "ROM",
    "가동범위",
    "관절가동범위",
    "근막",
    "fascia",
    "근육신장",
    "muscle stretching",
    "관절가동",
    "joint mobility",
    "유연성운동",
    "flexibility exercise",
    "동적스트레칭",
    "정적스트레칭",
    "PNF",
    "proprioceptive",
    "신경근",
    "neuromuscular",
];

/// How a single keyword is looked up.
#[derive(Debug, Clone)]
enum Matcher {
    /// Lowercased substring search
    Substring(String),
    /// Upper-case ASCII acronym, matched as a whole token
    Acronym(Regex),
}

impl Matcher {
    fn new(keyword: &str) -> Self {
        if is_acronym(keyword) {
            let pattern = format!(
                r"(?:^|[^A-Za-z0-9]){}(?:$|[^A-Za-z0-9])",
                regex::escape(keyword)
            );
            if let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() {
                return Self::Acronym(re);
            }
        }
        Self::Substring(keyword.to_lowercase())
    }

    fn is_match(&self, text: &str, lowered: &str) -> bool {
        match self {
            Self::Substring(needle) => !needle.is_empty() && lowered.contains(needle.as_str()),
            Self::Acronym(re) => re.is_match(text),
        }
    }
}

/// `ROM`, `PNF`: two or more upper-case ASCII letters or digits, at least one letter.
fn is_acronym(keyword: &str) -> bool {
    keyword.len() >= 2
        && keyword
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && keyword.chars().any(|c| c.is_ascii_uppercase())
}

/// Ordered keyword list matched case-insensitively.
///
/// Ordinary keywords are substrings of the text. Upper-case acronyms only
/// match as standalone tokens, so `ROM` finds "ROM 측정" but not "program".
#[derive(Debug, Clone)]
pub struct KeywordSet {
    keywords: Vec<String>,
    matchers: Vec<Matcher>,
}

impl PartialEq for KeywordSet {
    fn eq(&self, other: &Self) -> bool {
        self.keywords == other.keywords
    }
}

impl Eq for KeywordSet {}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        let matchers = keywords.iter().map(|k| Matcher::new(k)).collect();
        Self { keywords, matchers }
    }

    /// Keywords found in `text`, in list order (not text order).
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let lowered = text.to_lowercase();
        self.keywords
            .iter()
            .zip(&self.matchers)
            .filter(|(_, matcher)| matcher.is_match(text, &lowered))
            .map(|(keyword, _)| keyword.as_str())
            .collect()
    }

    pub fn contains_any(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.matchers.iter().any(|m| m.is_match(text, &lowered))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(STRETCHING_KEYWORDS.iter().copied())
    }
}
