use crate::dataset::{Dataset, DatasetBuilder};
use crate::schema::{EntryType, LineItem};

const SAMPLE_ROWS: [(&str, &str, f64, f64, EntryType); 18] = [
    ("Clerk Salary", "Administration", 42134.0, 19577.0, EntryType::Expenditure),
    ("Employer Pension", "Administration", 5099.0, 2617.0, EntryType::Expenditure),
    ("Training", "Administration", 500.0, 35.0, EntryType::Expenditure),
    ("Phone Rental", "Administration", 800.0, 316.0, EntryType::Expenditure),
    ("Insurance", "Administration", 900.0, 0.0, EntryType::Expenditure),
    ("IT Software", "Administration", 1000.0, 0.0, EntryType::Expenditure),
    ("Website Hosting", "Administration", 300.0, 228.0, EntryType::Expenditure),
    ("Bank Charges", "Administration", 54.0, 17.0, EntryType::Expenditure),
    ("Precept Income", "Income", -94160.0, -48351.0, EntryType::Income),
    ("Hall Income", "Income", -40000.0, -14571.0, EntryType::Income),
    ("VAT Reclaim", "Income", -1000.0, -1012.0, EntryType::Income),
    ("Bank Interest", "Income", -1500.0, -1076.0, EntryType::Income),
    ("Parks Maintenance", "Parks & Open Spaces", 2000.0, 484.0, EntryType::Expenditure),
    ("Street Lighting", "Parks & Open Spaces", 1500.0, 0.0, EntryType::Expenditure),
    ("Christmas Tree", "Parks & Open Spaces", 1500.0, 0.0, EntryType::Expenditure),
    ("Hall Utilities", "Community Hall", 32000.0, 2598.0, EntryType::Expenditure),
    ("Hall Cleaning", "Community Hall", 1800.0, 534.0, EntryType::Expenditure),
    ("Caretaker Salary", "Community Hall", 13828.0, 5419.0, EntryType::Expenditure),
];

/// A small but realistic parish budget for demos and tests: eighteen rows
/// across four categories, income recorded with negative amounts.
pub fn sample_dataset() -> Dataset {
    let items = SAMPLE_ROWS
        .iter()
        .map(|&(description, category, budget, actual, entry_type)| {
            LineItem::new(description, category, budget, actual, entry_type)
        });
    DatasetBuilder::default().build(items).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_dataset_shape() {
        let data = sample_dataset();
        assert_eq!(data.len(), 18);
        assert_eq!(
            data.categories(),
            vec!["Administration", "Income", "Parks & Open Spaces", "Community Hall"]
        );
        assert_eq!(data.filter(None, Some(EntryType::Income)).len(), 4);
        assert!(data.iter().all(|i| i.balance == i.budget - i.actual));
    }
}
