use crate::config::EngineConfig;
use crate::dataset::{BuildReport, Dataset, DatasetBuilder};
use crate::engine::{
    apply_probability_scenario, calculate_monte_carlo_simulation, calculate_risk_assessment,
    generate_cash_flow_projection, CashFlowRow, MonteCarloResult, ProbabilityMap, RiskRecord,
    ScenarioLibrary, ScenarioProjection,
};
use crate::error::{BudgetError, Result};
use crate::export::ExportBundle;
use crate::extractor::PdfLineExtractor;
use crate::reconciler::{ColumnReconciler, RawTable};
use crate::schema::{LineItem, ManualEntry};
use crate::summary::{summarize, SummaryStats};
use crate::validation::{validate_with_coercions, ValidationReport};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Pdf,
    Csv,
    Manual,
    Edit,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Csv => "CSV",
            Self::Manual => "manual",
            Self::Edit => "edit",
        }
    }
}

/// What a successful upload did to the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub source: DataSource,
    /// Rows in the dataset after the upload.
    pub records: usize,
    pub build: BuildReport,
    pub validation: ValidationReport,
    pub revision: u64,
}

/// The live dataset an administrator is working on, plus everything derived from it.
///
/// Every dataset mutation bumps `revision`; cached summary and risk results are
/// keyed by the revision they were computed at, so a stale cache is never served.
/// Failed uploads leave the session untouched.
pub struct BudgetSession {
    config: EngineConfig,
    extractor: PdfLineExtractor,
    reconciler: ColumnReconciler,
    builder: DatasetBuilder,
    dataset: Dataset,
    revision: u64,
    updated_at: DateTime<Utc>,
    active_scenario: Option<ProbabilityMap>,
    scenarios: ScenarioLibrary,
    summary_cache: Option<(u64, Option<SummaryStats>)>,
    risk_cache: Option<(u64, Vec<RiskRecord>)>,
}

impl Default for BudgetSession {
    fn default() -> Self {
        Self::with_valid_config(EngineConfig::default())
    }
}

impl BudgetSession {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: EngineConfig) -> Self {
        Self {
            extractor: PdfLineExtractor::new(&config.extractor),
            reconciler: ColumnReconciler::new(),
            builder: DatasetBuilder::new(&config.dataset),
            config,
            dataset: Dataset::empty(),
            revision: 0,
            updated_at: Utc::now(),
            active_scenario: None,
            scenarios: ScenarioLibrary::default(),
            summary_cache: None,
            risk_cache: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn commit(&mut self, dataset: Dataset) {
        self.dataset = dataset;
        self.revision += 1;
        self.updated_at = Utc::now();
        debug!(
            "Session now at revision {} with {} records",
            self.revision,
            self.dataset.len()
        );
    }

    fn finish_upload(
        &mut self,
        source: DataSource,
        dataset: Dataset,
        build: BuildReport,
        coerced_cells: usize,
    ) -> UploadOutcome {
        let validation = validate_with_coercions(&dataset, coerced_cells);
        self.commit(dataset);
        info!(
            "{:?} upload accepted: {} records ({} dropped)",
            source,
            build.kept,
            build.dropped_empty + build.dropped_noise
        );

        UploadOutcome {
            source,
            records: self.dataset.len(),
            build,
            validation,
            revision: self.revision,
        }
    }

    /// Replaces the dataset with the records extracted from a PDF's page text.
    /// A document with no recognizable line items is rejected.
    pub fn load_pdf_pages<S: AsRef<str>>(&mut self, pages: &[S]) -> Result<UploadOutcome> {
        let extraction = self.extractor.extract_document(pages)?;
        let (dataset, build) = self.builder.build(extraction.items);
        reject_empty(DataSource::Pdf, &dataset)?;
        Ok(self.finish_upload(DataSource::Pdf, dataset, build, 0))
    }

    /// Replaces the dataset with a CSV upload after reconciling its columns.
    pub fn load_csv<R: io::Read>(&mut self, reader: R) -> Result<UploadOutcome> {
        let table = RawTable::from_reader(reader)?;
        self.load_table(&table)
    }

    pub fn load_csv_path(&mut self, path: impl AsRef<Path>) -> Result<UploadOutcome> {
        let table = RawTable::from_path(path)?;
        self.load_table(&table)
    }

    fn load_table(&mut self, table: &RawTable) -> Result<UploadOutcome> {
        let import = self
            .reconciler
            .import(table, &self.config.dataset.default_category)?;
        let (dataset, build) = self.builder.build(import.items);
        reject_empty(DataSource::Csv, &dataset)?;
        Ok(self.finish_upload(DataSource::Csv, dataset, build, import.coerced_cells))
    }

    /// Appends one hand-typed row. Amounts must be finite and not negative.
    pub fn add_manual_entry(&mut self, entry: ManualEntry) -> Result<UploadOutcome> {
        validate_manual_entry(&entry)?;
        let (dataset, build) = self
            .builder
            .merge(&self.dataset, std::iter::once(entry.into_line_item()));
        Ok(self.finish_upload(DataSource::Manual, dataset, build, 0))
    }

    /// Edits the live rows in place, then re-cleans them like any other upload.
    ///
    /// Derived balances are refreshed after the edit; a row whose description is
    /// cleared is dropped. Removing every row is allowed.
    pub fn edit_items<F>(&mut self, edit: F) -> Result<UploadOutcome>
    where
        F: FnOnce(&mut Vec<LineItem>),
    {
        let mut items = self.dataset.items().to_vec();
        edit(&mut items);
        for item in &mut items {
            item.refresh_balance();
        }

        let (dataset, build) = self.builder.build(items);
        Ok(self.finish_upload(DataSource::Edit, dataset, build, 0))
    }

    pub fn replace_dataset(&mut self, dataset: Dataset) -> u64 {
        self.commit(dataset);
        self.revision
    }

    /// Projects the current dataset under `probabilities` and makes it the active scenario.
    /// An invalid map leaves the previous scenario active.
    pub fn apply_scenario(
        &mut self,
        probabilities: ProbabilityMap,
    ) -> Result<Vec<ScenarioProjection>> {
        let projection = apply_probability_scenario(&self.dataset, &probabilities)?;
        self.active_scenario = Some(probabilities);
        Ok(projection)
    }

    pub fn active_scenario(&self) -> Option<&ProbabilityMap> {
        self.active_scenario.as_ref()
    }

    pub fn save_scenario(
        &mut self,
        name: impl Into<String>,
        probabilities: &ProbabilityMap,
    ) -> Result<()> {
        self.scenarios.save(name, probabilities)
    }

    /// Makes a saved scenario active and projects it.
    pub fn load_scenario(&mut self, name: &str) -> Option<Result<Vec<ScenarioProjection>>> {
        let probabilities = self.scenarios.load(name)?.clone();
        Some(self.apply_scenario(probabilities))
    }

    pub fn scenarios(&self) -> &ScenarioLibrary {
        &self.scenarios
    }

    pub fn summary(&mut self) -> Option<SummaryStats> {
        match &self.summary_cache {
            Some((revision, stats)) if *revision == self.revision => {
                debug!("Summary cache hit at revision {}", revision);
                stats.clone()
            }
            _ => {
                let stats = summarize(&self.dataset);
                self.summary_cache = Some((self.revision, stats.clone()));
                stats
            }
        }
    }

    pub fn risk_assessment(&mut self) -> &[RiskRecord] {
        let fresh = matches!(&self.risk_cache, Some((revision, _)) if *revision == self.revision);
        if fresh {
            debug!("Risk cache hit at revision {}", self.revision);
        } else {
            self.risk_cache = Some((self.revision, calculate_risk_assessment(&self.dataset)));
        }

        match &self.risk_cache {
            Some((_, records)) => records,
            None => &[],
        }
    }

    pub fn cash_flow(&self) -> Vec<CashFlowRow> {
        let projection = &self.config.projection;
        generate_cash_flow_projection(
            &self.dataset,
            projection.months_ahead,
            projection.elapsed_months,
        )
    }

    pub fn monte_carlo(&self) -> Result<MonteCarloResult> {
        calculate_monte_carlo_simulation(&self.dataset, &self.config.monte_carlo)
    }

    pub fn export(&self) -> ExportBundle {
        ExportBundle::new(&self.dataset)
    }
}

pub(crate) fn reject_empty(source: DataSource, dataset: &Dataset) -> Result<()> {
    if dataset.is_empty() {
        warn!("{} upload rejected: no line items found", source.as_str());
        return Err(BudgetError::NoRecords(source.as_str().to_string()));
    }
    Ok(())
}

fn validate_manual_entry(entry: &ManualEntry) -> Result<()> {
    if entry.description.trim().is_empty() {
        return Err(BudgetError::InvalidEntry("description must not be empty".to_string()));
    }
    for (field, value) in [("budget", entry.budget), ("actual", entry.actual)] {
        if !value.is_finite() || value < 0.0 {
            return Err(BudgetError::InvalidEntry(format!(
                "{} must be zero or positive (got {})",
                field, value
            )));
        }
    }
    Ok(())
}
