use crate::config::DatasetConfig;
use crate::rules::KeywordSet;
use crate::schema::{EntryType, LineItem};
use crate::utils::{finite_or_zero, percentage_of};
use log::debug;
use serde::{Deserialize, Serialize};

/// The canonical row-set every downstream computation reads.
///
/// Only [`DatasetBuilder`] creates one, so rows always have a description,
/// a category and finite amounts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Dataset {
    items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceRow {
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub budget: f64,
    pub actual: f64,
    pub variance: f64,
    pub variance_pct: f64,
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Distinct categories in order of first appearance.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.category.as_str()) {
                seen.push(&item.category);
            }
        }
        seen
    }

    pub fn category_items(&self, category: &str) -> Vec<&LineItem> {
        self.items.iter().filter(|i| i.category == category).collect()
    }

    /// Rows matching both filters; `None` means no filtering on that field.
    pub fn filter(&self, category: Option<&str>, entry_type: Option<EntryType>) -> Dataset {
        let items = self
            .items
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .filter(|i| entry_type.map_or(true, |t| i.entry_type == t))
            .cloned()
            .collect();
        Dataset { items }
    }

    /// Case-insensitive search over description and category.
    pub fn search(&self, term: &str) -> Dataset {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.clone();
        }
        let items = self
            .items
            .iter()
            .filter(|i| {
                i.description.to_lowercase().contains(&term)
                    || i.category.to_lowercase().contains(&term)
            })
            .cloned()
            .collect();
        Dataset { items }
    }

    /// Rows ordered by absolute variance, largest first.
    pub fn variance_analysis(&self) -> Vec<VarianceRow> {
        let mut rows: Vec<VarianceRow> = self
            .items
            .iter()
            .map(|i| {
                let variance = i.variance();
                VarianceRow {
                    description: i.description.clone(),
                    category: i.category.clone(),
                    entry_type: i.entry_type,
                    budget: i.budget,
                    actual: i.actual,
                    variance,
                    variance_pct: (percentage_of(variance, i.budget) * 100.0).round() / 100.0,
                }
            })
            .collect();

        rows.sort_by(|a, b| b.variance.abs().total_cmp(&a.variance.abs()));
        rows
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub kept: usize,
    pub dropped_empty: usize,
    pub dropped_noise: usize,
    /// NaN or infinite amounts replaced with 0.0.
    pub coerced_values: usize,
}

pub struct DatasetBuilder {
    noise_markers: KeywordSet,
    default_category: String,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new(&DatasetConfig::default())
    }
}

impl DatasetBuilder {
    pub fn new(config: &DatasetConfig) -> Self {
        Self {
            noise_markers: KeywordSet::new(config.noise_markers.iter().cloned()).case_insensitive(),
            default_category: config.default_category.clone(),
        }
    }

    pub fn build<I>(&self, records: I) -> (Dataset, BuildReport)
    where
        I: IntoIterator<Item = LineItem>,
    {
        let mut report = BuildReport::default();
        let mut items = Vec::new();

        for mut item in records {
            item.description = item.description.trim().to_string();

            if item.description.is_empty() {
                report.dropped_empty += 1;
                continue;
            }

            if self.noise_markers.matches_any(&item.description) {
                debug!("Dropping noise row '{}'", item.description);
                report.dropped_noise += 1;
                continue;
            }

            item.code = item.code.trim().to_string();
            item.category = item.category.trim().to_string();
            if item.category.is_empty() {
                item.category = self.default_category.clone();
            }

            for value in [&mut item.budget, &mut item.actual, &mut item.balance] {
                if !value.is_finite() {
                    report.coerced_values += 1;
                    *value = finite_or_zero(*value);
                }
            }
            item.refresh_balance();

            items.push(item);
        }

        report.kept = items.len();
        (Dataset { items }, report)
    }

    /// Appends `records` to a copy of `base`, applying the same cleaning.
    pub fn merge<I>(&self, base: &Dataset, records: I) -> (Dataset, BuildReport)
    where
        I: IntoIterator<Item = LineItem>,
    {
        self.build(base.items.iter().cloned().chain(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(desc: &str, category: &str, budget: f64, actual: f64) -> LineItem {
        LineItem::new(desc, category, budget, actual, EntryType::Expenditure)
    }

    #[test]
    fn test_build_drops_noise_and_empty_rows() {
        let (dataset, report) = DatasetBuilder::default().build(vec![
            item("Clerks Salary", "Administration", 100.0, 40.0),
            item("   ", "Administration", 1.0, 1.0),
            item("Sub total", "Administration", 100.0, 40.0),
            item("PAGE 2", "", 0.0, 0.0),
            item("Training", "", 50.0, 10.0),
        ]);

        assert_eq!(dataset.len(), 2);
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped_empty, 1);
        assert_eq!(report.dropped_noise, 2);
        assert_eq!(dataset.items()[1].category, "General");
    }

    #[test]
    fn test_build_coerces_non_finite_values() {
        let mut bad = item("Insurance", "Administration", f64::NAN, f64::INFINITY);
        bad.balance = f64::NAN;
        let (dataset, report) = DatasetBuilder::default().build(vec![bad]);

        let row = &dataset.items()[0];
        assert_eq!(row.budget, 0.0);
        assert_eq!(row.actual, 0.0);
        assert_eq!(row.balance, 0.0);
        assert_eq!(report.coerced_values, 3);
    }

    #[test]
    fn test_balance_recomputed_unless_supplied() {
        let mut stale = item("Website", "Administration", 300.0, 228.0);
        stale.balance = 999.0;
        let supplied = item("Precept", "INCOME", 94160.0, 48351.0).with_supplied_balance(-45809.0);

        let (dataset, _) = DatasetBuilder::default().build(vec![stale, supplied]);
        assert_eq!(dataset.items()[0].balance, 72.0);
        assert_eq!(dataset.items()[1].balance, -45809.0);
    }

    #[test]
    fn test_categories_keep_first_appearance_order() {
        let (dataset, _) = DatasetBuilder::default().build(vec![
            item("A", "Parks", 1.0, 0.0),
            item("B", "Administration", 1.0, 0.0),
            item("C", "Parks", 1.0, 0.0),
        ]);
        assert_eq!(dataset.categories(), vec!["Parks", "Administration"]);
        assert_eq!(dataset.category_items("Parks").len(), 2);
    }

    #[test]
    fn test_filter_and_search() {
        let (dataset, _) = DatasetBuilder::default().build(vec![
            item("Hall Cleaning", "Community Hall", 1800.0, 534.0),
            LineItem::new("Hall Income", "Income", -40000.0, -14571.0, EntryType::Income),
            item("Street Lighting", "Parks", 1500.0, 0.0),
        ]);

        assert_eq!(dataset.filter(None, Some(EntryType::Income)).len(), 1);
        assert_eq!(dataset.filter(Some("Parks"), None).len(), 1);
        assert_eq!(dataset.filter(Some("Parks"), Some(EntryType::Income)).len(), 0);
        assert_eq!(dataset.search("hall").len(), 2);
        assert_eq!(dataset.search("").len(), 3);
    }

    #[test]
    fn test_variance_analysis_sorted_by_magnitude() {
        let (dataset, _) = DatasetBuilder::default().build(vec![
            item("Small", "A", 100.0, 90.0),
            item("Over", "A", 100.0, 400.0),
            item("Unbudgeted", "A", 0.0, 50.0),
        ]);
        let rows = dataset.variance_analysis();
        assert_eq!(rows[0].description, "Over");
        assert_eq!(rows[0].variance_pct, -300.0);
        assert_eq!(rows[1].description, "Unbudgeted");
        assert_eq!(rows[1].variance_pct, 0.0);
    }

    #[test]
    fn test_merge_appends() {
        let builder = DatasetBuilder::default();
        let (base, _) = builder.build(vec![item("A", "X", 1.0, 0.0)]);
        let (merged, report) = builder.merge(&base, vec![item("B", "Y", 2.0, 1.0)]);
        assert_eq!(merged.len(), 2);
        assert_eq!(report.kept, 2);
        assert_eq!(base.len(), 1);
    }
}
