use crate::config::MonteCarloConfig;
use crate::dataset::Dataset;
use crate::error::{BudgetError, Result};
use crate::schema::LineItem;
use crate::utils::percentage_of;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Category name → percentage (0–100) of the remaining budget expected to be realized.
pub type ProbabilityMap = BTreeMap<String, f64>;

/// Percentage assumed for categories missing from a [`ProbabilityMap`].
pub const DEFAULT_PROBABILITY: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioProjection {
    #[serde(flatten)]
    pub item: LineItem,
    pub probability_factor: f64,
    pub remaining_budget: f64,
    pub projected_remaining: f64,
    pub projected_total: f64,
    pub projected_variance: f64,
}

impl ScenarioProjection {
    fn project(item: &LineItem, probability_factor: f64) -> Self {
        let remaining_budget = item.remaining_budget();
        let projected_remaining = remaining_budget * probability_factor;
        let projected_total = item.actual + projected_remaining;

        Self {
            item: item.clone(),
            probability_factor,
            remaining_budget,
            projected_remaining,
            projected_total,
            projected_variance: item.budget - projected_total,
        }
    }
}

fn validate_probabilities(probabilities: &ProbabilityMap) -> Result<()> {
    for (category, &value) in probabilities {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(BudgetError::InvalidProbability {
                category: category.clone(),
                value,
            });
        }
    }
    Ok(())
}

/// Projects each row's year-end outturn assuming only a fraction of the
/// remaining budget is realized.
pub fn apply_probability_scenario(
    dataset: &Dataset,
    probabilities: &ProbabilityMap,
) -> Result<Vec<ScenarioProjection>> {
    validate_probabilities(probabilities)?;

    Ok(dataset
        .iter()
        .map(|item| {
            let percent = probabilities
                .get(&item.category)
                .copied()
                .unwrap_or(DEFAULT_PROBABILITY);
            ScenarioProjection::project(item, percent / 100.0)
        })
        .collect())
}

/// Sum of `projected_variance` without materializing the projection rows.
fn total_projected_variance<F>(dataset: &Dataset, percent_for: F) -> f64
where
    F: Fn(&str) -> f64,
{
    dataset
        .iter()
        .map(|item| {
            let factor = percent_for(&item.category) / 100.0;
            let projected_total = item.actual + item.remaining_budget() * factor;
            item.budget - projected_total
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "No Budget")]
    NoBudget,
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Critical Risk")]
    Critical,
}

impl RiskCategory {
    /// Zero budget wins over every threshold.
    pub fn classify(budget: f64, variance_pct: f64) -> Self {
        let magnitude = variance_pct.abs();
        if budget == 0.0 {
            Self::NoBudget
        } else if magnitude <= 5.0 {
            Self::Low
        } else if magnitude <= 15.0 {
            Self::Medium
        } else if magnitude <= 30.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NoBudget => "No Budget",
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
            Self::Critical => "Critical Risk",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    #[serde(flatten)]
    pub item: LineItem,
    pub variance_pct: f64,
    pub risk_category: RiskCategory,
    pub risk_score: f64,
}

pub fn calculate_risk_assessment(dataset: &Dataset) -> Vec<RiskRecord> {
    dataset
        .iter()
        .map(|item| {
            let variance_pct = percentage_of(item.variance(), item.budget);
            RiskRecord {
                item: item.clone(),
                variance_pct,
                risk_category: RiskCategory::classify(item.budget, variance_pct),
                risk_score: (variance_pct.abs() * 2.0).clamp(0.0, 100.0),
            }
        })
        .collect()
}

/// Number of records per risk category, in severity order.
pub fn risk_distribution(records: &[RiskRecord]) -> BTreeMap<RiskCategory, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.risk_category).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowRow {
    pub description: String,
    pub category: String,
    pub month: u32,
    pub monthly_projected: f64,
    pub cumulative_projected: f64,
    pub budget: f64,
    pub remaining_budget: f64,
}

/// Straight-line extrapolation of each row's run rate.
///
/// `elapsed_months` is how much of the year the actual figures cover; the
/// monthly run rate is `actual / elapsed_months` (zero when nothing has elapsed).
/// Emits `months_ahead` rows per item.
pub fn generate_cash_flow_projection(
    dataset: &Dataset,
    months_ahead: u32,
    elapsed_months: u32,
) -> Vec<CashFlowRow> {
    let mut rows = Vec::with_capacity(dataset.len() * months_ahead as usize);

    for item in dataset {
        let monthly = if elapsed_months > 0 {
            item.actual / elapsed_months as f64
        } else {
            0.0
        };

        let mut cumulative = item.actual;
        for month in 1..=months_ahead {
            cumulative += monthly;
            rows.push(CashFlowRow {
                description: item.description.clone(),
                category: item.category.clone(),
                month,
                monthly_projected: monthly,
                cumulative_projected: cumulative,
                budget: item.budget,
                remaining_budget: item.budget - cumulative,
            });
        }
    }

    rows
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub mean: f64,
    pub std: f64,
    pub percentile_5: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
    pub percentile_95: f64,
    /// Percentage of trials ending with a positive total variance (an underspend).
    pub probability_positive: f64,
    /// Total projected variance of every trial, in trial order.
    pub samples: Vec<f64>,
}

impl MonteCarloResult {
    pub fn from_samples(samples: Vec<f64>) -> Self {
        if samples.is_empty() {
            return Self {
                mean: 0.0,
                std: 0.0,
                percentile_5: 0.0,
                percentile_25: 0.0,
                percentile_75: 0.0,
                percentile_95: 0.0,
                probability_positive: 0.0,
                samples,
            };
        }

        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = samples.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let positive = samples.iter().filter(|&&x| x > 0.0).count() as f64;

        Self {
            mean,
            std: variance.sqrt(),
            percentile_5: percentile(&sorted, 5.0),
            percentile_25: percentile(&sorted, 25.0),
            percentile_75: percentile(&sorted, 75.0),
            percentile_95: percentile(&sorted, 95.0),
            probability_positive: positive / n * 100.0,
            samples,
        }
    }

    pub fn trials(&self) -> usize {
        self.samples.len()
    }
}

/// Linear interpolation between closest ranks over already sorted values.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        len => {
            let rank = (pct.clamp(0.0, 100.0) / 100.0) * (len - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

/// Runs the simulation with a generator seeded from `config.seed`, or from
/// OS entropy when no seed is set.
pub fn calculate_monte_carlo_simulation(
    dataset: &Dataset,
    config: &MonteCarloConfig,
) -> Result<MonteCarloResult> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    simulate_with_rng(dataset, config, &mut rng)
}

/// Each trial draws one probability per category from
/// Normal(`mean`, `std_dev`) clipped to `[min, max]` and records the
/// dataset-wide projected variance.
pub fn simulate_with_rng<R: Rng + ?Sized>(
    dataset: &Dataset,
    config: &MonteCarloConfig,
    rng: &mut R,
) -> Result<MonteCarloResult> {
    config.validate()?;
    let normal = Normal::new(config.mean, config.std_dev)
        .map_err(|e| BudgetError::Distribution(e.to_string()))?;

    let categories = dataset.categories();
    let mut draws: HashMap<&str, f64> = HashMap::with_capacity(categories.len());
    let mut samples = Vec::with_capacity(config.trials);

    for _ in 0..config.trials {
        for &category in &categories {
            let percent = normal.sample(rng).clamp(config.min, config.max);
            draws.insert(category, percent);
        }

        let total = total_projected_variance(dataset, |category| {
            draws.get(category).copied().unwrap_or(DEFAULT_PROBABILITY)
        });
        samples.push(total);
    }

    let result = MonteCarloResult::from_samples(samples);
    info!(
        "Monte Carlo: {} trials over {} categories, mean variance {:.2}, P(surplus) {:.1}%",
        result.trials(),
        categories.len(),
        result.mean,
        result.probability_positive
    );
    Ok(result)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario: String,
    pub total_budget: f64,
    pub total_projected: f64,
    pub total_variance: f64,
    pub variance_percentage: f64,
}

pub fn compare_scenarios(
    dataset: &Dataset,
    scenarios: &BTreeMap<String, ProbabilityMap>,
) -> Result<Vec<ScenarioComparison>> {
    let mut comparison = Vec::with_capacity(scenarios.len());

    for (name, probabilities) in scenarios {
        let projected = apply_probability_scenario(dataset, probabilities)?;

        let total_budget: f64 = projected.iter().map(|p| p.item.budget).sum();
        let total_projected: f64 = projected.iter().map(|p| p.projected_total).sum();
        let total_variance: f64 = projected.iter().map(|p| p.projected_variance).sum();

        comparison.push(ScenarioComparison {
            scenario: name.clone(),
            total_budget,
            total_projected,
            total_variance,
            variance_percentage: percentage_of(total_variance, total_budget),
        });
    }

    Ok(comparison)
}

/// Quick one-click scenarios. Values depend only on each category's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioPreset {
    Conservative,
    Optimistic,
    Pessimistic,
}

impl ScenarioPreset {
    pub fn probabilities(&self, categories: &[&str]) -> ProbabilityMap {
        categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let percent = match self {
                    Self::Conservative => 70.0 - (i % 3) as f64 * 5.0,
                    Self::Optimistic => 95.0,
                    Self::Pessimistic => 50.0 + (i % 2) as f64 * 10.0,
                };
                (category.to_string(), percent)
            })
            .collect()
    }
}

/// Four randomized starting scenarios with uniform per-category draws.
pub fn random_default_scenarios<R: Rng + ?Sized>(
    categories: &[&str],
    rng: &mut R,
) -> BTreeMap<String, ProbabilityMap> {
    let ranges = [
        ("Conservative", 60.0, 80.0),
        ("Optimistic", 90.0, 100.0),
        ("Pessimistic", 40.0, 60.0),
        ("Realistic", 70.0, 90.0),
    ];

    ranges
        .iter()
        .map(|&(name, low, high)| {
            let probabilities = categories
                .iter()
                .map(|c| (c.to_string(), rng.gen_range(low..high)))
                .collect();
            (name.to_string(), probabilities)
        })
        .collect()
}

/// Named probability scenarios kept for later reuse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioLibrary {
    scenarios: BTreeMap<String, ProbabilityMap>,
}

impl ScenarioLibrary {
    pub fn save(&mut self, name: impl Into<String>, probabilities: &ProbabilityMap) -> Result<()> {
        validate_probabilities(probabilities)?;
        let name = name.into();
        debug!("Saving scenario '{}' with {} categories", name, probabilities.len());
        self.scenarios.insert(name, probabilities.clone());
        Ok(())
    }

    pub fn load(&self, name: &str) -> Option<&ProbabilityMap> {
        self.scenarios.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ProbabilityMap> {
        self.scenarios.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(|k| k.as_str())
    }

    pub fn scenarios(&self) -> &BTreeMap<String, ProbabilityMap> {
        &self.scenarios
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DatasetBuilder;
    use crate::sample::sample_dataset;
    use crate::schema::EntryType;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn dataset(items: Vec<LineItem>) -> Dataset {
        DatasetBuilder::default().build(items).0
    }

    fn two_rows() -> Dataset {
        dataset(vec![
            LineItem::new("Salary", "Administration", 1000.0, 400.0, EntryType::Expenditure),
            LineItem::new("Mowing", "Parks", 200.0, 50.0, EntryType::Expenditure),
        ])
    }

    #[test]
    fn test_scenario_projection_math() {
        let mut probabilities = ProbabilityMap::new();
        probabilities.insert("Administration".to_string(), 50.0);

        let rows = apply_probability_scenario(&two_rows(), &probabilities).unwrap();

        let salary = &rows[0];
        assert_eq!(salary.probability_factor, 0.5);
        assert_eq!(salary.remaining_budget, 600.0);
        assert_eq!(salary.projected_remaining, 300.0);
        assert_eq!(salary.projected_total, 700.0);
        assert_eq!(salary.projected_variance, 300.0);

        // Parks is not in the map, so the whole remaining budget is realized
        let mowing = &rows[1];
        assert_eq!(mowing.probability_factor, 1.0);
        assert_eq!(mowing.projected_total, 200.0);
        assert_eq!(mowing.projected_variance, 0.0);
    }

    #[test]
    fn test_full_probability_has_no_variance() {
        let data = sample_dataset();
        let probabilities: ProbabilityMap = data
            .categories()
            .into_iter()
            .map(|c| (c.to_string(), 100.0))
            .collect();

        for row in apply_probability_scenario(&data, &probabilities).unwrap() {
            assert!(row.projected_variance.abs() < EPS);
            assert!((row.projected_total - row.item.budget).abs() < EPS);
        }
    }

    #[test]
    fn test_invalid_probability_rejected() {
        let mut probabilities = ProbabilityMap::new();
        probabilities.insert("Parks".to_string(), 120.0);
        let err = apply_probability_scenario(&two_rows(), &probabilities).unwrap_err();
        assert!(matches!(err, BudgetError::InvalidProbability { value, .. } if value == 120.0));

        probabilities.insert("Parks".to_string(), f64::NAN);
        assert!(apply_probability_scenario(&two_rows(), &probabilities).is_err());
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RiskCategory::classify(0.0, 0.0), RiskCategory::NoBudget);
        assert_eq!(RiskCategory::classify(100.0, 5.0), RiskCategory::Low);
        assert_eq!(RiskCategory::classify(100.0, -5.0), RiskCategory::Low);
        assert_eq!(RiskCategory::classify(100.0, 15.0), RiskCategory::Medium);
        assert_eq!(RiskCategory::classify(100.0, 30.0), RiskCategory::High);
        assert_eq!(RiskCategory::classify(100.0, 30.01), RiskCategory::Critical);
        assert_eq!(RiskCategory::Critical.to_string(), "Critical Risk");
    }

    #[test]
    fn test_risk_assessment_records() {
        let data = dataset(vec![
            LineItem::new("Salary", "Administration", 1000.0, 400.0, EntryType::Expenditure),
            LineItem::new("Christmas Tree", "Parks", 0.0, 120.0, EntryType::Expenditure),
            LineItem::new("Insurance", "Administration", 900.0, 880.0, EntryType::Expenditure),
        ]);
        let records = calculate_risk_assessment(&data);

        assert_eq!(records[0].variance_pct, 60.0);
        assert_eq!(records[0].risk_category, RiskCategory::Critical);
        assert_eq!(records[0].risk_score, 100.0);

        assert_eq!(records[1].variance_pct, 0.0);
        assert_eq!(records[1].risk_category, RiskCategory::NoBudget);
        assert_eq!(records[1].risk_score, 0.0);

        assert_eq!(records[2].risk_category, RiskCategory::Low);

        let counts = risk_distribution(&records);
        assert_eq!(counts.get(&RiskCategory::Critical), Some(&1));
        assert_eq!(counts.get(&RiskCategory::Medium), None);
    }

    #[test]
    fn test_risk_record_serializes_flat() {
        let records = calculate_risk_assessment(&two_rows());
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["description"], "Salary");
        assert_eq!(json["risk_category"], "Critical Risk");
        assert_eq!(json["type"], "Expenditure");
    }

    #[test]
    fn test_cash_flow_projection() {
        let data = dataset(vec![LineItem::new(
            "Salary",
            "Administration",
            1200.0,
            500.0,
            EntryType::Expenditure,
        )]);
        let rows = generate_cash_flow_projection(&data, 3, 5);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].month, 1);
        assert_eq!(rows[0].monthly_projected, 100.0);
        assert_eq!(rows[0].cumulative_projected, 600.0);
        assert_eq!(rows[2].cumulative_projected, 800.0);
        assert_eq!(rows[2].remaining_budget, 400.0);
    }

    #[test]
    fn test_cash_flow_zero_elapsed_months() {
        let rows = generate_cash_flow_projection(&two_rows(), 2, 0);
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.monthly_projected == 0.0));
        assert_eq!(rows[1].cumulative_projected, 400.0);
        assert!(generate_cash_flow_projection(&Dataset::empty(), 12, 5).is_empty());
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 25.0), 2.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert!((percentile(&sorted, 95.0) - 4.8).abs() < EPS);
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }

    #[test]
    fn test_from_samples_statistics() {
        let result = MonteCarloResult::from_samples(vec![-2.0, 0.0, 2.0, 4.0]);
        assert_eq!(result.mean, 1.0);
        assert!((result.std - 5.0_f64.sqrt()).abs() < EPS);
        assert_eq!(result.probability_positive, 50.0);
        assert_eq!(result.trials(), 4);
    }

    #[test]
    fn test_monte_carlo_seeded_is_reproducible() {
        let data = sample_dataset();
        let config = MonteCarloConfig::seeded(7);

        let first = calculate_monte_carlo_simulation(&data, &config).unwrap();
        let second = calculate_monte_carlo_simulation(&data, &config).unwrap();

        assert_eq!(first.samples.len(), 1000);
        assert_eq!(first, second);
        assert!(first.percentile_5 <= first.percentile_25);
        assert!(first.percentile_25 <= first.percentile_75);
        assert!(first.percentile_75 <= first.percentile_95);
        assert!((0.0..=100.0).contains(&first.probability_positive));
    }

    #[test]
    fn test_monte_carlo_zero_trials_and_empty_dataset() {
        let config = MonteCarloConfig::seeded(1).with_trials(0);
        let result = calculate_monte_carlo_simulation(&two_rows(), &config).unwrap();
        assert!(result.samples.is_empty());
        assert_eq!(result.mean, 0.0);

        let config = MonteCarloConfig::seeded(1).with_trials(10);
        let result = calculate_monte_carlo_simulation(&Dataset::empty(), &config).unwrap();
        assert_eq!(result.samples, vec![0.0; 10]);
        assert_eq!(result.probability_positive, 0.0);
    }

    #[test]
    fn test_monte_carlo_degenerate_distribution() {
        // With no spread every draw is clipped to the same value
        let config = MonteCarloConfig {
            std_dev: 0.0,
            mean: 50.0,
            seed: Some(3),
            trials: 20,
            ..MonteCarloConfig::default()
        };
        let result = calculate_monte_carlo_simulation(&two_rows(), &config).unwrap();
        // remaining 600 + 150, half unrealized
        assert!(result.samples.iter().all(|s| (s - 375.0).abs() < EPS));
        assert!(result.std.abs() < EPS);
        assert_eq!(result.probability_positive, 100.0);
    }

    #[test]
    fn test_compare_scenarios_and_presets() {
        let data = two_rows();
        let categories = data.categories();

        let mut scenarios = BTreeMap::new();
        for preset in [ScenarioPreset::Optimistic, ScenarioPreset::Pessimistic] {
            scenarios.insert(format!("{:?}", preset), preset.probabilities(&categories));
        }

        let comparison = compare_scenarios(&data, &scenarios).unwrap();
        assert_eq!(comparison.len(), 2);
        assert_eq!(comparison[0].scenario, "Optimistic");
        assert_eq!(comparison[0].total_budget, 1200.0);
        assert!(comparison[1].total_variance > comparison[0].total_variance);

        let conservative = ScenarioPreset::Conservative.probabilities(&["A", "B", "C", "D"]);
        assert_eq!(conservative["A"], 70.0);
        assert_eq!(conservative["C"], 60.0);
        assert_eq!(conservative["D"], 70.0);
    }

    #[test]
    fn test_random_default_scenarios_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let scenarios = random_default_scenarios(&["Parks", "Hall"], &mut rng);

        assert_eq!(scenarios.len(), 4);
        for value in scenarios["Optimistic"].values() {
            assert!((90.0..100.0).contains(value));
        }
        for value in scenarios["Pessimistic"].values() {
            assert!((40.0..60.0).contains(value));
        }
    }

    #[test]
    fn test_scenario_library() {
        let mut library = ScenarioLibrary::default();
        let mut probabilities = ProbabilityMap::new();
        probabilities.insert("Parks".to_string(), 80.0);

        library.save("Board view", &probabilities).unwrap();
        assert_eq!(library.load("Board view"), Some(&probabilities));
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["Board view"]);

        probabilities.insert("Hall".to_string(), -1.0);
        assert!(library.save("Broken", &probabilities).is_err());
        assert!(library.load("Broken").is_none());
        assert!(library.remove("Board view").is_some());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_risk_classification_is_total(
            budget in -1.0e9f64..1.0e9,
            actual in -1.0e9f64..1.0e9,
        ) {
            let row = LineItem::new("Row", "Cat", budget, actual, EntryType::Expenditure);
            let data = dataset(vec![row]);
            let record = &calculate_risk_assessment(&data)[0];

            prop_assert!((0.0..=100.0).contains(&record.risk_score));
            if budget == 0.0 {
                prop_assert_eq!(record.risk_category, RiskCategory::NoBudget);
            } else {
                prop_assert!(record.risk_category != RiskCategory::NoBudget);
            }
        }

        #[test]
        fn prop_zero_budget_is_always_no_budget(actual in -1.0e9f64..1.0e9) {
            let row = LineItem::new("Row", "Cat", 0.0, actual, EntryType::Expenditure);
            let data = dataset(vec![row]);
            let record = &calculate_risk_assessment(&data)[0];
            prop_assert_eq!(record.risk_category, RiskCategory::NoBudget);
            prop_assert_eq!(record.variance_pct, 0.0);
        }

        #[test]
        fn prop_monte_carlo_percentiles_are_ordered(seed in 0u64..u64::MAX, trials in 1usize..200) {
            let config = MonteCarloConfig::seeded(seed).with_trials(trials);
            let result = calculate_monte_carlo_simulation(&sample_dataset(), &config).unwrap();

            prop_assert_eq!(result.samples.len(), trials);
            prop_assert!(result.percentile_5 <= result.percentile_25);
            prop_assert!(result.percentile_25 <= result.percentile_75);
            prop_assert!(result.percentile_75 <= result.percentile_95);
        }
    }
}
