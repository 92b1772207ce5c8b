use thiserror::Error;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Could not find required columns {missing:?} after column mapping (found: {found:?})")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid probability {value} for category '{category}': must be between 0 and 100")]
    InvalidProbability { category: String, value: f64 },

    #[error("Invalid manual entry: {0}")]
    InvalidEntry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Distribution error: {0}")]
    Distribution(String),

    #[error("Document contained no readable page text")]
    EmptyDocument,

    #[error("No budget line items found in {0} upload")]
    NoRecords(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BudgetError {
    /// Canonical column names that were unmet, if this is a schema failure.
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            BudgetError::Schema { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, BudgetError>;
