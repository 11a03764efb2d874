pub mod analysis;
pub mod config;
pub mod error;
pub mod ledger;
pub mod report;
pub mod statements;
pub mod types;

pub use config::AnalysisConfig;
pub use error::LedgerInsightsError;
pub use ledger::entry::{InMemoryLedger, LedgerEntry, LedgerSource};
pub use report::{
    analyze_ledger, compute_financials, compute_financials_from, FinancialReport,
    LedgerAnalysisInput,
};
pub use types::*;

/// Standard result type for all ledger-insights operations
pub type LedgerInsightsResult<T> = Result<T, LedgerInsightsError>;
