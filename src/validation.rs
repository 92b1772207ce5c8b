use crate::dataset::Dataset;
use crate::schema::EntryType;
use crate::utils::percentage_of;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows whose |variance %| exceeds this are flagged.
pub const LARGE_VARIANCE_PCT: f64 = 50.0;

/// Advisory findings about a loaded dataset. Never blocks acceptance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    fn warning(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

pub fn validate_dataset(dataset: &Dataset) -> ValidationReport {
    validate_with_coercions(dataset, 0)
}

/// Same as [`validate_dataset`], also reporting how many source cells were
/// unparseable and replaced with zero during import.
pub fn validate_with_coercions(dataset: &Dataset, coerced_cells: usize) -> ValidationReport {
    let mut report = ValidationReport::default();

    if dataset.is_empty() {
        report.errors.push("Dataset is empty".to_string());
        return report;
    }

    if coerced_cells > 0 {
        report.warning(format!(
            "{} numeric cells could not be parsed and were set to 0",
            coerced_cells
        ));
    }

    let zero_budget_spend = dataset
        .iter()
        .filter(|i| i.budget == 0.0 && i.actual != 0.0)
        .count();
    if zero_budget_spend > 0 {
        report.warning(format!(
            "{} items have zero budget but actual spending",
            zero_budget_spend
        ));
    }

    let large_variances = dataset
        .iter()
        .filter(|i| percentage_of(i.variance(), i.budget).abs() > LARGE_VARIANCE_PCT)
        .count();
    if large_variances > 0 {
        report.warning(format!("{} items have >50% variance", large_variances));
    }

    let negative_budgets = dataset.iter().filter(|i| i.budget < 0.0).count();
    if negative_budgets > 0 {
        report
            .info
            .push(format!("{} items have negative budget values", negative_budgets));
    }

    report.info.push(format!("Total records: {}", dataset.len()));
    report
        .info
        .push(format!("Unique categories: {}", dataset.categories().len()));

    let mut distribution: BTreeMap<EntryType, usize> = BTreeMap::new();
    for item in dataset {
        *distribution.entry(item.entry_type).or_insert(0) += 1;
    }
    let distribution = distribution
        .iter()
        .map(|(t, n)| format!("{}: {}", t, n))
        .collect::<Vec<_>>()
        .join(", ");
    report.info.push(format!("Type distribution: {}", distribution));

    report
}
