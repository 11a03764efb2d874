pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::Value;

/// How a ledger report is printed on stdout.
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// The whole computation envelope
    Json,
    /// One row per report section
    Table,
    /// Flattened `section.field,value` rows
    Csv,
    /// Headline figures only (score, net result, totals)
    Minimal,
}

impl OutputFormat {
    pub fn render(&self, value: &Value) {
        match self {
            Self::Json => json::print_json(value),
            Self::Table => table::print_table(value),
            Self::Csv => csv_out::print_csv(value),
            Self::Minimal => minimal::print_minimal(value),
        }
    }
}
