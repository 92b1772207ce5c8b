use crate::dataset::Dataset;
use crate::error::Result;
use crate::summary::summarize;
use crate::utils::percentage_of;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryRowKind {
    #[serde(rename = "All")]
    Total,
    #[serde(rename = "Category Total")]
    Category,
    #[serde(rename = "Type Total")]
    Type,
}

/// One row of the summary sheet handed to spreadsheet exporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "Category")]
    pub label: String,
    #[serde(rename = "Type")]
    pub kind: SummaryRowKind,
    #[serde(rename = "Budget")]
    pub budget: f64,
    #[serde(rename = "Actual")]
    pub actual: f64,
    #[serde(rename = "Variance")]
    pub variance: f64,
    #[serde(rename = "Variance_%")]
    pub variance_pct: f64,
}

impl SummaryRow {
    fn new(label: impl Into<String>, kind: SummaryRowKind, budget: f64, actual: f64) -> Self {
        let variance = budget - actual;
        Self {
            label: label.into(),
            kind,
            budget,
            actual,
            variance,
            variance_pct: percentage_of(variance, budget),
        }
    }
}

/// `TOTAL` first, then one row per category and one per type, each group
/// sorted by name. Empty for an empty dataset.
pub fn build_summary_table(dataset: &Dataset) -> Vec<SummaryRow> {
    let Some(stats) = summarize(dataset) else {
        return Vec::new();
    };

    let mut rows = vec![SummaryRow {
        label: "TOTAL".to_string(),
        kind: SummaryRowKind::Total,
        budget: stats.total_budget,
        actual: stats.total_actual,
        variance: stats.total_variance,
        variance_pct: stats.variance_percentage,
    }];

    let mut by_category: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    let mut by_type: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for item in dataset {
        let cat = by_category.entry(item.category.as_str()).or_insert((0.0, 0.0));
        cat.0 += item.budget;
        cat.1 += item.actual;

        let kind = by_type.entry(item.entry_type.as_str()).or_insert((0.0, 0.0));
        kind.0 += item.budget;
        kind.1 += item.actual;
    }

    rows.extend(
        by_category
            .into_iter()
            .map(|(name, (b, a))| SummaryRow::new(name, SummaryRowKind::Category, b, a)),
    );
    rows.extend(
        by_type
            .into_iter()
            .map(|(name, (b, a))| SummaryRow::new(name, SummaryRowKind::Type, b, a)),
    );
    rows
}

/// Everything an exporter needs in one serializable value.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle {
    pub generated_at: DateTime<Utc>,
    pub records: Dataset,
    pub summary: Vec<SummaryRow>,
}

impl ExportBundle {
    pub fn new(dataset: &Dataset) -> Self {
        Self {
            generated_at: Utc::now(),
            records: dataset.clone(),
            summary: build_summary_table(dataset),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_records_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for item in &self.records {
            csv.serialize(item)?;
        }
        csv.flush()?;
        info!("Exported {} records as CSV", self.records.len());
        Ok(())
    }

    pub fn write_summary_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.summary {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }
}
