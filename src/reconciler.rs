//! Maps arbitrary CSV headers onto the canonical line-item columns.
//!
//! Headers are normalized (`"Item Name"` → `"item_name"`) and matched against
//! a priority-ordered alias list per canonical column. Reconciliation runs once
//! at ingestion so nothing downstream has to guess column names.

use crate::error::{BudgetError, Result};
use crate::schema::{EntryType, LineItem};
use crate::utils::{normalize_column_name, parse_amount};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalColumn {
    Description,
    Budget,
    Actual,
    Category,
    Balance,
    Code,
}

impl CanonicalColumn {
    /// Resolution order. Earlier targets claim a source column first.
    pub const ORDER: [CanonicalColumn; 6] = [
        Self::Description,
        Self::Budget,
        Self::Actual,
        Self::Category,
        Self::Balance,
        Self::Code,
    ];

    pub const REQUIRED: [CanonicalColumn; 3] = [Self::Description, Self::Budget, Self::Actual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Budget => "budget",
            Self::Actual => "actual",
            Self::Category => "category",
            Self::Balance => "balance",
            Self::Code => "code",
        }
    }

    fn default_aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Description => &["description", "desc", "item", "item_name", "name", "details"],
            Self::Budget => &["budget", "budget_2025_26", "budgeted", "planned", "allocation"],
            Self::Actual => &["actual", "actual_net", "spent", "used", "expenditure"],
            Self::Category => &["category", "cat", "type", "group", "section"],
            Self::Balance => &["balance", "remaining", "variance", "difference"],
            Self::Code => &["code", "account_code", "ref", "reference", "id"],
        }
    }
}

fn decode_record(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect()
}

/// A CSV file held in memory: one header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Reads a CSV from any byte source.
    ///
    /// Bytes that are not UTF-8 (a Windows-1252 `£` from a spreadsheet export,
    /// say) decode to U+FFFD instead of failing the upload; an amount cell
    /// holding one is later coerced to 0.0 and counted.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = decode_record(reader.byte_headers()?);
        let mut rows = Vec::new();
        for record in reader.byte_records() {
            rows.push(decode_record(&record?));
        }

        Ok(Self { headers, rows })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Missing trailing cells in ragged rows read as empty.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|s| s.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub target: CanonicalColumn,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub mappings: Vec<ColumnMapping>,
    /// An unclaimed `type` column carrying explicit Income/Expenditure labels.
    pub type_column: Option<usize>,
    /// Headers after renaming: mapped columns carry their canonical name,
    /// others keep their normalized name.
    pub headers: Vec<String>,
}

impl Reconciliation {
    pub fn index_of(&self, column: CanonicalColumn) -> Option<usize> {
        self.mappings
            .iter()
            .find(|m| m.target == column)
            .map(|m| m.index)
    }

    /// True when no column had to be renamed.
    pub fn is_identity(&self) -> bool {
        self.mappings.iter().all(|m| m.source == m.target.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CsvImport {
    pub items: Vec<LineItem>,
    pub reconciliation: Reconciliation,
    /// Numeric cells that were blank or unparseable and became 0.0.
    pub coerced_cells: usize,
}

pub struct ColumnReconciler {
    aliases: Vec<(CanonicalColumn, Vec<String>)>,
}

impl Default for ColumnReconciler {
    fn default() -> Self {
        Self {
            aliases: CanonicalColumn::ORDER
                .iter()
                .map(|c| (*c, c.default_aliases().iter().map(|a| a.to_string()).collect()))
                .collect(),
        }
    }
}

impl ColumnReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an extra alias at the lowest priority for `column`.
    pub fn with_alias(mut self, column: CanonicalColumn, alias: &str) -> Self {
        if let Some((_, list)) = self.aliases.iter_mut().find(|(c, _)| *c == column) {
            list.push(normalize_column_name(alias));
        }
        self
    }

    pub fn reconcile(&self, headers: &[String]) -> Result<Reconciliation> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_column_name(h)).collect();
        let mut claimed = vec![false; normalized.len()];
        let mut mappings = Vec::new();

        for (target, aliases) in &self.aliases {
            let hit = aliases.iter().find_map(|alias| {
                normalized
                    .iter()
                    .enumerate()
                    .find(|(i, name)| !claimed[*i] && *name == alias)
                    .map(|(i, _)| i)
            });

            if let Some(index) = hit {
                claimed[index] = true;
                mappings.push(ColumnMapping {
                    source: normalized[index].clone(),
                    target: *target,
                    index,
                });
            }
        }

        let missing: Vec<String> = CanonicalColumn::REQUIRED
            .iter()
            .filter(|c| !mappings.iter().any(|m| m.target == **c))
            .map(|c| c.as_str().to_string())
            .collect();

        if !missing.is_empty() {
            warn!(
                "Column mapping failed: missing {:?}, original columns {:?}",
                missing, headers
            );
            return Err(BudgetError::Schema {
                missing,
                found: headers.to_vec(),
            });
        }

        let type_column = normalized
            .iter()
            .enumerate()
            .find(|(i, name)| !claimed[*i] && name.as_str() == "type")
            .map(|(i, _)| i);

        let mut renamed = normalized;
        for mapping in &mappings {
            renamed[mapping.index] = mapping.target.as_str().to_string();
            if mapping.source != mapping.target.as_str() {
                info!("Column mapping applied: {} → {}", mapping.source, mapping.target.as_str());
            }
        }

        Ok(Reconciliation {
            mappings,
            type_column,
            headers: renamed,
        })
    }

    /// Reconciles the table and converts every row into a [`LineItem`].
    /// Row filtering is left to the dataset builder.
    pub fn import(&self, table: &RawTable, default_category: &str) -> Result<CsvImport> {
        let reconciliation = self.reconcile(&table.headers)?;

        let col = |c: CanonicalColumn| reconciliation.index_of(c);
        // Required columns are present once reconcile() succeeded
        let (Some(desc_idx), Some(budget_idx), Some(actual_idx)) = (
            col(CanonicalColumn::Description),
            col(CanonicalColumn::Budget),
            col(CanonicalColumn::Actual),
        ) else {
            return Err(BudgetError::Schema {
                missing: vec![],
                found: table.headers.clone(),
            });
        };
        let category_idx = col(CanonicalColumn::Category);
        let balance_idx = col(CanonicalColumn::Balance);
        let code_idx = col(CanonicalColumn::Code);

        let mut coerced_cells = 0;
        let mut amount = |row: usize, idx: usize| match parse_amount(table.cell(row, idx)) {
            Some(v) => v,
            None => {
                coerced_cells += 1;
                0.0
            }
        };

        let mut items = Vec::with_capacity(table.rows.len());
        for row in 0..table.rows.len() {
            let budget = amount(row, budget_idx);
            let actual = amount(row, actual_idx);
            let balance = balance_idx.map(|idx| amount(row, idx));

            let category = category_idx
                .map(|idx| table.cell(row, idx).trim())
                .filter(|c| !c.is_empty())
                .unwrap_or(default_category);

            let entry_type = reconciliation
                .type_column
                .and_then(|idx| EntryType::parse_label(table.cell(row, idx)))
                .unwrap_or_else(|| EntryType::from_budget_sign(budget));

            let mut item = LineItem::new(
                table.cell(row, desc_idx).trim(),
                category,
                budget,
                actual,
                entry_type,
            );
            if let Some(idx) = code_idx {
                item = item.with_code(table.cell(row, idx).trim());
            }
            if let Some(balance) = balance {
                item = item.with_supplied_balance(balance);
            }
            items.push(item);
        }

        info!(
            "Imported {} CSV rows ({} numeric cells coerced to 0)",
            items.len(),
            coerced_cells
        );

        Ok(CsvImport {
            items,
            reconciliation,
            coerced_cells,
        })
    }
}
