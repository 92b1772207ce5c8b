//! Budget line recovery from PDF page text.
//!
//! Council budget reports print one line item per row:
//!
//! ```text
//! EXPENDITURE
//! Administration
//! 4000 Clerks Salary £42,134.00 £19,577.64 £22,556.36
//! 1076 Precept £94,160.00 £48,351.00 -£45,809.00
//! Bank Charges £54.00 £17.00 £37.00
//! ```
//!
//! Each line is classified as a header, a line item (coded or simple) or
//! noise. Headers set the category for the rows that follow, including rows
//! on later pages. Lines that match neither grammar rule are dropped.

use crate::config::ExtractorConfig;
use crate::error::{BudgetError, Result};
use crate::rules::{default_type_rules, KeywordSet, RuleTable};
use crate::schema::{EntryType, LineItem};
use crate::utils::clean_currency;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn coded_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<code>\d{3,4})\s+",
            r"(?P<desc>[^£$€]+?)\s+",
            r"(?P<budget>-?[£$€]-?\d[\d,]*(?:\.\d+)?)\s+",
            r"(?P<actual>-?[£$€]-?\d[\d,]*(?:\.\d+)?)\s+",
            r"(?P<balance>-?[£$€]?-?\d[\d,]*(?:\.\d+)?)"
        ))
        .expect("invalid coded line regex")
    })
}

fn simple_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<desc>[^£$€]+?)\s+",
            r"(?P<budget>-?[£$€]-?\d[\d,]*(?:\.\d+)?)\s+",
            r"(?P<actual>-?[£$€]-?\d[\d,]*(?:\.\d+)?)\s+",
            r"(?P<balance>-?[£$€]?-?\d[\d,]*(?:\.\d+)?)"
        ))
        .expect("invalid simple line regex")
    })
}

/// Amounts recovered from one report row, before a category is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub code: String,
    pub description: String,
    pub budget: f64,
    pub actual: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    /// Blank line or report furniture such as the column header row.
    Skip,
    /// A category header that applies to the following rows.
    Header(String),
    Item(ParsedLine),
    Unrecognized,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub pages: usize,
    pub pages_without_records: usize,
    pub headers: usize,
    pub records: usize,
    pub skipped: usize,
    pub unrecognized: usize,
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub items: Vec<LineItem>,
    pub report: ExtractionReport,
}

pub struct PdfLineExtractor {
    header_indicators: KeywordSet,
    boilerplate: KeywordSet,
    type_rules: RuleTable<EntryType>,
    max_simple_description_words: usize,
}

impl Default for PdfLineExtractor {
    fn default() -> Self {
        Self::new(&ExtractorConfig::default())
    }
}

impl PdfLineExtractor {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            header_indicators: KeywordSet::new(config.header_indicators.iter().cloned()),
            boilerplate: KeywordSet::new(config.boilerplate_markers.iter().cloned()),
            type_rules: default_type_rules(),
            max_simple_description_words: config.max_simple_description_words,
        }
    }

    pub fn with_type_rules(mut self, rules: RuleTable<EntryType>) -> Self {
        self.type_rules = rules;
        self
    }

    pub fn classify_line(&self, raw: &str) -> LineClass {
        let line = raw.trim();

        if line.is_empty() || self.boilerplate.matches_any(line) {
            return LineClass::Skip;
        }

        if self.is_category_header(line) {
            return LineClass::Header(line.to_string());
        }

        if let Some(parsed) = self.match_coded(line) {
            return LineClass::Item(parsed);
        }

        if let Some(parsed) = self.match_simple(line) {
            return LineClass::Item(parsed);
        }

        LineClass::Unrecognized
    }

    fn is_category_header(&self, line: &str) -> bool {
        self.header_indicators.matches_any(line) && !line.chars().any(|c| c.is_ascii_digit())
    }

    fn match_coded(&self, line: &str) -> Option<ParsedLine> {
        let caps = coded_line_re().captures(line)?;
        Some(ParsedLine {
            code: caps["code"].to_string(),
            description: caps["desc"].trim().to_string(),
            budget: clean_currency(&caps["budget"]),
            actual: clean_currency(&caps["actual"]),
            balance: clean_currency(&caps["balance"]),
        })
    }

    fn match_simple(&self, line: &str) -> Option<ParsedLine> {
        let caps = simple_line_re().captures(line)?;
        let description = caps["desc"].trim();

        // Wrapped prose that happens to end in amounts tends to be long
        if description.split_whitespace().count() > self.max_simple_description_words {
            return None;
        }

        Some(ParsedLine {
            code: String::new(),
            description: description.to_string(),
            budget: clean_currency(&caps["budget"]),
            actual: clean_currency(&caps["actual"]),
            balance: clean_currency(&caps["balance"]),
        })
    }

    /// Scans pages in order. The active category carries across page breaks.
    pub fn extract_pages<S: AsRef<str>>(&self, pages: &[S]) -> Extraction {
        let mut items = Vec::new();
        let mut report = ExtractionReport::default();
        let mut current_category = String::new();

        for (page_idx, page) in pages.iter().enumerate() {
            report.pages += 1;
            let before = items.len();

            for line in page.as_ref().lines() {
                match self.classify_line(line) {
                    LineClass::Skip => report.skipped += 1,
                    LineClass::Header(header) => {
                        report.headers += 1;
                        current_category = header;
                    }
                    LineClass::Item(parsed) => {
                        let entry_type = self.type_rules.resolve(&current_category);
                        items.push(
                            LineItem::new(
                                parsed.description,
                                current_category.clone(),
                                parsed.budget,
                                parsed.actual,
                                entry_type,
                            )
                            .with_code(parsed.code)
                            .with_supplied_balance(parsed.balance),
                        );
                    }
                    LineClass::Unrecognized => {
                        debug!(
                            "Page {}: dropped unrecognized line '{}'",
                            page_idx + 1,
                            line.trim()
                        );
                        report.unrecognized += 1;
                    }
                }
            }

            if items.len() == before {
                report.pages_without_records += 1;
            }
        }

        report.records = items.len();
        Extraction { items, report }
    }

    /// Like [`extract_pages`](Self::extract_pages) but fails once, up front,
    /// when the document has no text at all.
    pub fn extract_document<S: AsRef<str>>(&self, pages: &[S]) -> Result<Extraction> {
        if pages.iter().all(|p| p.as_ref().trim().is_empty()) {
            return Err(BudgetError::EmptyDocument);
        }

        let extraction = self.extract_pages(pages);
        info!(
            "Extracted {} records from {} pages ({} headers, {} unrecognized lines)",
            extraction.report.records,
            extraction.report.pages,
            extraction.report.headers,
            extraction.report.unrecognized
        );
        Ok(extraction)
    }
}
