//! Ledger documents from a file or piped stdin.

use serde_json::{Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use ledger_insights_core::{LedgerAnalysisInput, LedgerEntry};

type InputResult<T> = Result<T, Box<dyn std::error::Error>>;

/// The two accepted shapes of a ledger document.
#[derive(Debug)]
pub enum LedgerPayload {
    /// A bare list of entries; the fiscal year has to come from the flags
    Entries(Vec<LedgerEntry>),
    /// `{"fiscal_year", "entries", "config"}`
    Document(Map<String, Value>),
}

impl LedgerPayload {
    pub fn parse(text: &str) -> InputResult<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Array(entries) => Ok(Self::Entries(serde_json::from_value(Value::Array(
                entries,
            ))?)),
            Value::Object(map) => Ok(Self::Document(map)),
            _ => Err("expected a JSON object or an array of entries".into()),
        }
    }

    /// Turn the payload into engine input. `fiscal_year`, when given, wins
    /// over the one in the document.
    pub fn into_analysis_input(self, fiscal_year: Option<i32>) -> InputResult<LedgerAnalysisInput> {
        match self {
            Self::Entries(entries) => Ok(LedgerAnalysisInput {
                fiscal_year: fiscal_year
                    .ok_or("--fiscal-year is required when the input is a bare list of entries")?,
                entries,
                config: None,
            }),
            Self::Document(mut map) => {
                if let Some(year) = fiscal_year {
                    map.insert("fiscal_year".into(), Value::from(year));
                }
                if !map.contains_key("fiscal_year") {
                    return Err("fiscal_year missing from input (or pass --fiscal-year)".into());
                }
                Ok(serde_json::from_value(Value::Object(map))?)
            }
        }
    }
}

/// Read the ledger at `path`, or the one piped on stdin when no path is given.
pub fn read_ledger(path: Option<&str>) -> InputResult<LedgerPayload> {
    let (origin, text) = match path {
        Some(path) => (format!("'{path}'"), read_text(path)?),
        None => match read_piped()? {
            Some(text) => ("stdin".to_string(), text),
            None => {
                return Err("no ledger supplied: use --input <file> or pipe JSON on stdin".into())
            }
        },
    };
    LedgerPayload::parse(&text)
        .map_err(|e| format!("Failed to parse ledger from {}: {}", origin, e).into())
}

/// Whole text file, path resolved against the working directory.
pub fn read_text(path: &str) -> InputResult<String> {
    let resolved = resolve_path(path)?;
    let contents = fs::read_to_string(&resolved)
        .map_err(|e| format!("Failed to read '{}': {}", resolved.display(), e))?;
    Ok(contents)
}

/// Piped stdin, or None on an interactive terminal or an empty pipe.
fn read_piped() -> InputResult<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn resolve_path(path: &str) -> InputResult<PathBuf> {
    let p = Path::new(path);
    let resolved = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };
    if !resolved.is_file() {
        return Err(format!("File not found: {}", resolved.display()).into());
    }
    Ok(resolved)
}
