use crate::dataset::Dataset;
use crate::schema::EntryType;
use crate::utils::percentage_of;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_budget: f64,
    pub total_actual: f64,
    pub total_variance: f64,
    pub variance_percentage: f64,
    pub income_budget: f64,
    pub income_actual: f64,
    pub expense_budget: f64,
    pub expense_actual: f64,
    pub completion_rate: f64,
}

/// Plain additive totals over the whole dataset. `None` for an empty dataset.
pub fn summarize(dataset: &Dataset) -> Option<SummaryStats> {
    if dataset.is_empty() {
        return None;
    }

    let mut stats = SummaryStats {
        total_budget: 0.0,
        total_actual: 0.0,
        total_variance: 0.0,
        variance_percentage: 0.0,
        income_budget: 0.0,
        income_actual: 0.0,
        expense_budget: 0.0,
        expense_actual: 0.0,
        completion_rate: 0.0,
    };

    for item in dataset {
        stats.total_budget += item.budget;
        stats.total_actual += item.actual;
        match item.entry_type {
            EntryType::Income => {
                stats.income_budget += item.budget;
                stats.income_actual += item.actual;
            }
            EntryType::Expenditure => {
                stats.expense_budget += item.budget;
                stats.expense_actual += item.actual;
            }
        }
    }

    stats.total_variance = stats.total_budget - stats.total_actual;
    stats.variance_percentage = percentage_of(stats.total_variance, stats.total_budget);
    stats.completion_rate = percentage_of(stats.total_actual, stats.total_budget);

    Some(stats)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub budget: f64,
    pub actual: f64,
    pub balance: f64,
    /// Share of the budget received (income) or spent (expenditure), one decimal place.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub total_budget: f64,
    pub total_actual: f64,
    pub total_balance: f64,
    pub categories: Vec<String>,
    pub breakdown: Vec<CategoryBreakdown>,
}

/// Totals and per-category breakdown for one side of the budget.
/// Breakdown rows are sorted by category name.
pub fn type_summary(dataset: &Dataset, entry_type: EntryType) -> TypeSummary {
    let subset = dataset.filter(None, Some(entry_type));
    if subset.is_empty() {
        return TypeSummary::default();
    }

    let categories: Vec<String> = subset.categories().into_iter().map(String::from).collect();

    let mut breakdown: Vec<CategoryBreakdown> = categories
        .iter()
        .map(|category| {
            let (budget, actual) = subset
                .category_items(category)
                .iter()
                .fold((0.0, 0.0), |(b, a), i| (b + i.budget, a + i.actual));
            CategoryBreakdown {
                category: category.clone(),
                budget,
                actual,
                balance: budget - actual,
                percentage: (percentage_of(actual, budget) * 10.0).round() / 10.0,
            }
        })
        .collect();
    breakdown.sort_by(|a, b| a.category.cmp(&b.category));

    let total_budget: f64 = subset.iter().map(|i| i.budget).sum();
    let total_actual: f64 = subset.iter().map(|i| i.actual).sum();

    TypeSummary {
        total_budget,
        total_actual,
        total_balance: total_budget - total_actual,
        categories,
        breakdown,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetPosition {
    pub net_budget: f64,
    pub net_actual: f64,
    pub net_balance: f64,
}

/// Income minus expenditure for budget, actual and balance.
pub fn net_position(dataset: &Dataset) -> NetPosition {
    let income = type_summary(dataset, EntryType::Income);
    let expenditure = type_summary(dataset, EntryType::Expenditure);

    NetPosition {
        net_budget: income.total_budget - expenditure.total_budget,
        net_actual: income.total_actual - expenditure.total_actual,
        net_balance: income.total_balance - expenditure.total_balance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetBuilder;
    use crate::schema::LineItem;

    fn dataset(items: Vec<LineItem>) -> Dataset {
        DatasetBuilder::default().build(items).0
    }

    #[test]
    fn test_empty_dataset_has_no_summary() {
        assert_eq!(summarize(&Dataset::empty()), None);
    }

    #[test]
    fn test_summary_totals() {
        let data = dataset(vec![
            LineItem::new("Salary", "Administration", 1000.0, 400.0, EntryType::Expenditure),
            LineItem::new("Hall", "Hall", 500.0, 100.0, EntryType::Expenditure),
            LineItem::new("Precept", "Income", -2000.0, -1000.0, EntryType::Income),
        ]);
        let stats = summarize(&data).unwrap();

        assert_eq!(stats.total_budget, -500.0);
        assert_eq!(stats.total_actual, -500.0);
        assert_eq!(stats.total_variance, 0.0);
        assert_eq!(stats.variance_percentage, 0.0);
        assert_eq!(stats.income_budget, -2000.0);
        assert_eq!(stats.expense_actual, 500.0);
        assert_eq!(stats.completion_rate, 100.0);
    }

    #[test]
    fn test_zero_budget_guards() {
        let data = dataset(vec![
            LineItem::new("Grant", "Income", 0.0, 250.0, EntryType::Income),
            LineItem::new("Refund", "Administration", 0.0, -50.0, EntryType::Expenditure),
        ]);
        let stats = summarize(&data).unwrap();
        assert_eq!(stats.total_budget, 0.0);
        assert_eq!(stats.variance_percentage, 0.0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn test_type_summary_and_net_position() {
        let data = dataset(vec![
            LineItem::new("Precept", "Income", 90000.0, 45000.0, EntryType::Income),
            LineItem::new("Interest", "Bank", 1500.0, 1076.0, EntryType::Income),
            LineItem::new("Salary", "Administration", 40000.0, 19577.0, EntryType::Expenditure),
        ]);

        let income = type_summary(&data, EntryType::Income);
        assert_eq!(income.total_budget, 91500.0);
        assert_eq!(income.breakdown.len(), 2);
        assert_eq!(income.breakdown[0].category, "Bank");
        assert_eq!(income.breakdown[0].percentage, 71.7);

        let net = net_position(&data);
        assert_eq!(net.net_budget, 51500.0);
        assert_eq!(net.net_actual, 46076.0 - 19577.0);

        assert_eq!(type_summary(&Dataset::empty(), EntryType::Income), TypeSummary::default());
    }
}
