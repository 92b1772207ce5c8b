use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, JsonSchema,
)]
#[serde(rename_all = "PascalCase")]
pub enum EntryType {
    #[schemars(description = "Money received by the council: precept, hall hire, grants, VAT reclaims, interest")]
    Income,

    #[schemars(description = "Money spent by the council: salaries, maintenance, utilities, insurance")]
    Expenditure,
}

impl EntryType {
    /// Negative budgets are how income lines are usually recorded in council reports.
    pub fn from_budget_sign(budget: f64) -> Self {
        if budget < 0.0 {
            Self::Income
        } else {
            Self::Expenditure
        }
    }

    /// Parses a free-text label such as `"income"` or `" Expenditure "`.
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expenditure" | "expense" => Some(Self::Expenditure),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expenditure => "Expenditure",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the canonical dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    #[serde(default)]
    #[schemars(description = "Short account code from the report (e.g. '4000'). Empty when the source has none.")]
    pub code: String,

    #[schemars(description = "Human readable label of the budget line (e.g. 'Clerks Salary')")]
    pub description: String,

    #[schemars(description = "Grouping label such as 'Administration' or 'Parks & Open Spaces'")]
    pub category: String,

    #[schemars(description = "Planned amount for the fiscal period. Income lines are often negative.")]
    pub budget: f64,

    #[schemars(description = "Amount recorded to date")]
    pub actual: f64,

    #[schemars(description = "Budget minus actual, unless a value was supplied by the source document or user")]
    pub balance: f64,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    #[serde(default)]
    #[schemars(description = "True when `balance` came from the source rather than being derived")]
    pub balance_supplied: bool,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        category: impl Into<String>,
        budget: f64,
        actual: f64,
        entry_type: EntryType,
    ) -> Self {
        Self {
            code: String::new(),
            description: description.into(),
            category: category.into(),
            budget,
            actual,
            balance: budget - actual,
            entry_type,
            balance_supplied: false,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_supplied_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self.balance_supplied = true;
        self
    }

    pub fn set_budget(&mut self, budget: f64) {
        self.budget = budget;
        self.refresh_balance();
    }

    pub fn set_actual(&mut self, actual: f64) {
        self.actual = actual;
        self.refresh_balance();
    }

    /// Drops a supplied balance and goes back to `budget - actual`.
    pub fn clear_supplied_balance(&mut self) {
        self.balance_supplied = false;
        self.refresh_balance();
    }

    pub fn refresh_balance(&mut self) {
        if !self.balance_supplied {
            self.balance = self.budget - self.actual;
        }
    }

    /// Budget minus actual, regardless of any supplied balance.
    pub fn variance(&self) -> f64 {
        self.budget - self.actual
    }

    pub fn remaining_budget(&self) -> f64 {
        self.budget - self.actual
    }
}

/// The fixed category list offered by the manual entry form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum ManualCategory {
    Administration,
    Income,
    #[serde(rename = "Parks & Open Spaces")]
    ParksAndOpenSpaces,
    #[serde(rename = "Cawston Community Hall")]
    CommunityHall,
    #[serde(rename = "Section 137")]
    Section137,
    Other,
}

impl ManualCategory {
    pub const ALL: [ManualCategory; 6] = [
        Self::Administration,
        Self::Income,
        Self::ParksAndOpenSpaces,
        Self::CommunityHall,
        Self::Section137,
        Self::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Administration => "Administration",
            Self::Income => "Income",
            Self::ParksAndOpenSpaces => "Parks & Open Spaces",
            Self::CommunityHall => "Cawston Community Hall",
            Self::Section137 => "Section 137",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ManualCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single row typed in by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ManualEntry {
    pub description: String,
    pub category: ManualCategory,
    #[schemars(description = "Budget amount, must be zero or positive")]
    pub budget: f64,
    #[schemars(description = "Actual amount, must be zero or positive")]
    pub actual: f64,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
}

impl ManualEntry {
    pub fn into_line_item(self) -> LineItem {
        LineItem::new(
            self.description.trim(),
            self.category.label(),
            self.budget,
            self.actual,
            self.entry_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_follows_operands() {
        let mut item = LineItem::new(
            "Clerks Salary",
            "Administration",
            1000.0,
            400.0,
            EntryType::Expenditure,
        );
        assert_eq!(item.balance, 600.0);

        item.set_actual(700.0);
        assert_eq!(item.balance, 300.0);

        item.set_budget(500.0);
        assert_eq!(item.balance, -200.0);
    }

    #[test]
    fn test_supplied_balance_is_kept() {
        let mut item = LineItem::new("Precept", "INCOME", 94160.0, 48351.0, EntryType::Income)
            .with_supplied_balance(-45809.0);
        item.set_actual(50000.0);
        assert_eq!(item.balance, -45809.0);

        item.clear_supplied_balance();
        assert_eq!(item.balance, 44160.0);
    }

    #[test]
    fn test_entry_type_inference() {
        assert_eq!(EntryType::from_budget_sign(-10.0), EntryType::Income);
        assert_eq!(EntryType::from_budget_sign(0.0), EntryType::Expenditure);
        assert_eq!(EntryType::parse_label(" income "), Some(EntryType::Income));
        assert_eq!(EntryType::parse_label("Expenditure"), Some(EntryType::Expenditure));
        assert_eq!(EntryType::parse_label("other"), None);
    }

    #[test]
    fn test_serialization_uses_type_field() {
        let item = LineItem::new("Training", "Administration", 500.0, 35.0, EntryType::Expenditure)
            .with_code("4010");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"Expenditure\""));

        let back: LineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_manual_category_labels() {
        let json = serde_json::to_string(&ManualCategory::ParksAndOpenSpaces).unwrap();
        assert_eq!(json, "\"Parks & Open Spaces\"");
        assert_eq!(ManualCategory::ALL.len(), 6);
    }
}
