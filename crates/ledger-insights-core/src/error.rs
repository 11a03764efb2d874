use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerInsightsError {
    #[error("Invalid fiscal year: {year} (expected {min}..={max})")]
    InvalidFiscalYear { year: i32, min: i32, max: i32 },

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Ledger source error: {0}")]
    Source(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LedgerInsightsError {
    fn from(e: serde_json::Error) -> Self {
        LedgerInsightsError::SerializationError(e.to_string())
    }
}
