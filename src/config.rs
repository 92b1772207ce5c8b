use crate::error::{BudgetError, Result};
use crate::rules::{DEFAULT_BOILERPLATE_MARKERS, DEFAULT_HEADER_INDICATORS, DEFAULT_NOISE_MARKERS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExtractorConfig {
    #[schemars(
        description = "Substrings that mark a digit-free line as a category header (e.g. 'INCOME', 'Administration'). Matching is case-sensitive."
    )]
    pub header_indicators: Vec<String>,

    #[schemars(description = "Lines containing any of these are report furniture and are skipped.")]
    pub boilerplate_markers: Vec<String>,

    #[schemars(
        description = "A line without an account code is only accepted when its description has at most this many words."
    )]
    pub max_simple_description_words: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            header_indicators: DEFAULT_HEADER_INDICATORS.iter().map(|s| s.to_string()).collect(),
            boilerplate_markers: DEFAULT_BOILERPLATE_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_simple_description_words: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DatasetConfig {
    #[schemars(description = "Category given to rows whose source has no category column.")]
    pub default_category: String,

    #[schemars(
        description = "Rows whose description contains any of these (case-insensitive) are dropped as totals or page furniture."
    )]
    pub noise_markers: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            default_category: "General".to_string(),
            noise_markers: DEFAULT_NOISE_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ProjectionConfig {
    #[schemars(
        description = "Months of the fiscal year already covered by the actual figures. Drives the straight-line monthly run rate."
    )]
    pub elapsed_months: u32,

    #[schemars(description = "How many future months the cash-flow projection emits per line item.")]
    pub months_ahead: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            elapsed_months: 5,
            months_ahead: 12,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct MonteCarloConfig {
    pub trials: usize,

    #[schemars(description = "Mean of the per-category probability draw, in percent.")]
    pub mean: f64,

    #[schemars(description = "Standard deviation of the per-category probability draw, in percent.")]
    pub std_dev: f64,

    #[schemars(description = "Draws are clipped to [min, max] percent.")]
    pub min: f64,

    pub max: f64,

    #[schemars(description = "Fixed seed for reproducible runs. Omit to seed from OS entropy.")]
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            mean: 75.0,
            std_dev: 20.0,
            min: 10.0,
            max: 100.0,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.mean.is_finite() {
            return Err(BudgetError::InvalidConfig(format!(
                "Monte Carlo mean must be finite (got {})",
                self.mean
            )));
        }
        if !self.std_dev.is_finite() || self.std_dev < 0.0 {
            return Err(BudgetError::InvalidConfig(format!(
                "Monte Carlo std_dev must be a non-negative number (got {})",
                self.std_dev
            )));
        }
        if !(0.0..=100.0).contains(&self.min) || !(0.0..=100.0).contains(&self.max) {
            return Err(BudgetError::InvalidConfig(format!(
                "Monte Carlo clip bounds must lie within 0..=100 (got {}..={})",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(BudgetError::InvalidConfig(format!(
                "Monte Carlo min {} is greater than max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EngineConfig {
    pub extractor: ExtractorConfig,
    pub dataset: DatasetConfig,
    pub projection: ProjectionConfig,
    pub monte_carlo: MonteCarloConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.extractor.header_indicators.iter().any(|s| s.trim().is_empty()) {
            return Err(BudgetError::InvalidConfig(
                "Header indicators must not be blank".to_string(),
            ));
        }
        if self.dataset.default_category.trim().is_empty() {
            return Err(BudgetError::InvalidConfig(
                "Default category must not be blank".to_string(),
            ));
        }
        self.monte_carlo.validate()
    }

    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(EngineConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::json_schema())
    }
}
