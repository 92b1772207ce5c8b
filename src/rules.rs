//! Keyword heuristics as data.
//!
//! Category headers, Income/Expenditure inference and noise-row detection
//! are all substring tests against short keyword lists. Keeping them in
//! ordered tables lets callers extend the vocabulary for other councils
//! without touching the parsing code.

use crate::schema::EntryType;

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRule<T> {
    pub pattern: String,
    pub result: T,
}

/// Ordered `(pattern, result)` pairs. The first pattern found in the text wins;
/// otherwise the fallback applies.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable<T> {
    rules: Vec<KeywordRule<T>>,
    fallback: T,
    case_insensitive: bool,
}

impl<T: Clone> RuleTable<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn with_rule(mut self, pattern: impl Into<String>, result: T) -> Self {
        self.push(pattern, result);
        self
    }

    pub fn push(&mut self, pattern: impl Into<String>, result: T) {
        self.rules.push(KeywordRule {
            pattern: pattern.into(),
            result,
        });
    }

    pub fn rules(&self) -> &[KeywordRule<T>] {
        &self.rules
    }

    pub fn first_match(&self, text: &str) -> Option<&T> {
        let folded = self.fold(text);
        self.rules
            .iter()
            .find(|rule| folded.contains(&self.fold(&rule.pattern)))
            .map(|rule| &rule.result)
    }

    pub fn resolve(&self, text: &str) -> T {
        self.first_match(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn fold(&self, text: &str) -> String {
        if self.case_insensitive {
            text.to_lowercase()
        } else {
            text.to_string()
        }
    }
}

/// Income when the active category header mentions `INCOME`, Expenditure otherwise.
pub fn default_type_rules() -> RuleTable<EntryType> {
    RuleTable::new(EntryType::Expenditure).with_rule("INCOME", EntryType::Income)
}

/// A flat keyword list answering "does the text contain any of these?".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
    case_insensitive: bool,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            case_insensitive: false,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self.keywords = self.keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn matches_any(&self, text: &str) -> bool {
        if self.case_insensitive {
            let lowered = text.to_lowercase();
            self.keywords.iter().any(|k| lowered.contains(k.as_str()))
        } else {
            self.keywords.iter().any(|k| text.contains(k.as_str()))
        }
    }
}

pub const DEFAULT_HEADER_INDICATORS: [&str; 7] = [
    "INCOME",
    "EXPENDITURE",
    "Administration",
    "Cawston Community Hall",
    "Parks & Open Spaces",
    "Section 137",
    "Total",
];

pub const DEFAULT_BOILERPLATE_MARKERS: [&str; 2] = ["Balance", "Actual Net"];

pub const DEFAULT_NOISE_MARKERS: [&str; 2] = ["Total", "Page"];
