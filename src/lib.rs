//! # Parish Budget Engine
//!
//! A library for turning parish-council budget reports (PDF page text or CSV exports)
//! into a canonical dataset, and for projecting year-end outturn and risk over it.
//!
//! ## Core Concepts
//!
//! - **Line Item**: One budget row with a description, category, budget, actual and balance
//! - **Canonical Dataset**: Cleaned rows every calculation reads, whatever the source format
//! - **Variance**: `budget - actual`; positive means underspend (or income still to arrive)
//! - **Probability Factor**: Share of the remaining budget expected to be realized by year end
//! - **Risk Score**: 0–100 severity derived from the variance percentage
//!
//! ## Example
//!
//! ```rust,ignore
//! use parish_budget_engine::*;
//!
//! let csv = "Item Name,Budgeted,Spent\nClerk Salary,42134,19577\n";
//! let (dataset, report) = BudgetProcessor::new(EngineConfig::default())?
//!     .process_csv(csv.as_bytes())?;
//!
//! let stats = summarize(&dataset).unwrap();
//! let risk = calculate_risk_assessment(&dataset);
//! let simulation = calculate_monte_carlo_simulation(&dataset, &MonteCarloConfig::seeded(42))?;
//! ```

pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod export;
pub mod extractor;
pub mod reconciler;
pub mod rules;
pub mod sample;
pub mod schema;
pub mod session;
pub mod summary;
pub mod utils;
pub mod validation;

pub use config::{DatasetConfig, EngineConfig, ExtractorConfig, MonteCarloConfig, ProjectionConfig};
pub use dataset::{BuildReport, Dataset, DatasetBuilder, VarianceRow};
pub use engine::*;
pub use error::{BudgetError, Result};
pub use export::{build_summary_table, ExportBundle, SummaryRow, SummaryRowKind};
pub use extractor::{Extraction, ExtractionReport, LineClass, ParsedLine, PdfLineExtractor};
pub use reconciler::{
    CanonicalColumn, ColumnMapping, ColumnReconciler, CsvImport, RawTable, Reconciliation,
};
pub use rules::{default_type_rules, KeywordRule, KeywordSet, RuleTable};
pub use sample::sample_dataset;
pub use schema::*;
pub use session::{BudgetSession, DataSource, UploadOutcome};
pub use summary::*;
pub use utils::*;
pub use validation::{validate_dataset, validate_with_coercions, ValidationReport};

use log::{debug, info};
use std::io;

/// Stateless pipeline from raw input to a validated canonical dataset.
pub struct BudgetProcessor {
    config: EngineConfig,
    extractor: PdfLineExtractor,
    reconciler: ColumnReconciler,
    builder: DatasetBuilder,
}

impl BudgetProcessor {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            extractor: PdfLineExtractor::new(&config.extractor),
            reconciler: ColumnReconciler::new(),
            builder: DatasetBuilder::new(&config.dataset),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fails with [`BudgetError::NoRecords`] when no page yields a line item.
    pub fn process_pdf_pages<S: AsRef<str>>(
        &self,
        pages: &[S],
    ) -> Result<(Dataset, ValidationReport)> {
        info!("Processing PDF text: {} pages", pages.len());

        let extraction = self.extractor.extract_document(pages)?;
        let (dataset, build) = self.builder.build(extraction.items);
        debug!("Dataset build report: {:?}", build);
        session::reject_empty(DataSource::Pdf, &dataset)?;

        let report = validate_dataset(&dataset);
        Ok((dataset, report))
    }

    pub fn process_csv<R: io::Read>(&self, reader: R) -> Result<(Dataset, ValidationReport)> {
        let table = RawTable::from_reader(reader)?;
        info!(
            "Processing CSV: {} columns, {} rows",
            table.headers.len(),
            table.rows.len()
        );

        let import = self
            .reconciler
            .import(&table, &self.config.dataset.default_category)?;
        let (dataset, build) = self.builder.build(import.items);
        debug!("Dataset build report: {:?}", build);
        session::reject_empty(DataSource::Csv, &dataset)?;

        let report = validate_with_coercions(&dataset, import.coerced_cells);
        Ok((dataset, report))
    }
}

pub fn process_pdf_pages<S: AsRef<str>>(pages: &[S]) -> Result<(Dataset, ValidationReport)> {
    BudgetProcessor::new(EngineConfig::default())?.process_pdf_pages(pages)
}

pub fn process_csv<R: io::Read>(reader: R) -> Result<(Dataset, ValidationReport)> {
    BudgetProcessor::new(EngineConfig::default())?.process_csv(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_pdf_processing() {
        let pages = [
            "Cawston Parish Council\nINCOME\n1076 Precept £94,160.00 £48,351.00 -£45,809.00\n",
            concat!(
                "EXPENDITURE\nAdministration\n",
                "4000 Clerks Salary £42,134.00 £19,577.64 £22,556.36\n",
                "Bank Charges £54.00 £17.00 £37.00\n",
            ),
        ];

        let (dataset, report) = process_pdf_pages(&pages).unwrap();
        assert_eq!(dataset.len(), 3);
        assert!(!report.has_errors());

        let precept = &dataset.items()[0];
        assert_eq!(precept.entry_type, EntryType::Income);
        assert_eq!(precept.balance, -45809.0);

        let charges = &dataset.items()[2];
        assert_eq!(charges.category, "Administration");
        assert_eq!(charges.entry_type, EntryType::Expenditure);
    }

    #[test]
    fn test_end_to_end_csv_processing() {
        let csv = concat!(
            "Desc,Budget 2025 26,Actual Net,Cat\n",
            "Insurance,900,0,Administration\n",
            "Precept,-94160,-48351,Income\n",
        );
        let (dataset, report) = process_csv(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.categories(), vec!["Administration", "Income"]);
        assert!(report.info.contains(&"Total records: 2".to_string()));
    }

    #[test]
    fn test_processor_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.dataset.default_category = "  ".to_string();
        assert!(matches!(
            BudgetProcessor::new(config),
            Err(BudgetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_inputs_without_line_items_are_rejected() {
        let result = process_pdf_pages(&["Cawston Parish Council\nPage 1 of 1\n"]);
        assert!(matches!(result, Err(BudgetError::NoRecords(_))));

        let result = process_csv("description,budget,actual\nTotal,1,1\n".as_bytes());
        assert!(matches!(result, Err(BudgetError::NoRecords(_))));
    }
}
