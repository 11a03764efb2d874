//! Removal of bank recap lines.
//!
//! Banks periodically post a summary line ("arrêté de compte", "intérêts et
//! frais") restating fees and interest that were already booked one by one.
//! Keeping both double-counts financial charges. A line is dropped when its
//! account root is in the configured fee/interest roots AND its label matches
//! one of the configured markers.
//!
//! This is a heuristic. An unrecognised recap wording is kept and inflates
//! the charges; a genuine line whose label happens to match is dropped. The
//! summary returned alongside the filtered entries makes both auditable.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, MarkerKind, RecapMarker};
use crate::error::LedgerInsightsError;
use crate::ledger::classifier::classify;
use crate::ledger::entry::LedgerEntry;
use crate::types::Money;
use crate::LedgerInsightsResult;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// An entry dropped by the filter, with the marker that caught it.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedEntry<'a> {
    pub marker: String,
    pub entry: &'a LedgerEntry,
}

/// Entries split into kept and removed, borrowing from the input slice.
#[derive(Debug, Clone, Default)]
pub struct FilteredLedger<'a> {
    pub kept: Vec<&'a LedgerEntry>,
    pub removed: Vec<RemovedEntry<'a>>,
}

/// Totals of what the filter removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateSummary {
    pub removed_count: usize,
    pub removed_debit: Money,
    pub removed_credit: Money,
    /// removed_debit - removed_credit
    pub removed_net: Money,
    pub by_marker: BTreeMap<String, usize>,
}

impl<'a> FilteredLedger<'a> {
    pub fn summary(&self) -> DuplicateSummary {
        let mut summary = DuplicateSummary::default();
        for removed in &self.removed {
            summary.removed_count += 1;
            summary.removed_debit += removed.entry.debit;
            summary.removed_credit += removed.entry.credit;
            *summary.by_marker.entry(removed.marker.clone()).or_insert(0) += 1;
        }
        summary.removed_net = summary.removed_debit - summary.removed_credit;
        summary
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Matcher {
    /// Lower-cased needle
    Substring(String),
    Regex(Regex),
}

#[derive(Debug, Clone)]
struct CompiledMarker {
    tag: String,
    matcher: Matcher,
}

impl CompiledMarker {
    fn compile(marker: &RecapMarker) -> LedgerInsightsResult<Self> {
        let matcher = match marker.kind {
            MarkerKind::Substring => Matcher::Substring(marker.pattern.to_lowercase()),
            MarkerKind::Regex => {
                let re = RegexBuilder::new(&marker.pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| LedgerInsightsError::InvalidInput {
                        field: "bank_fee_duplicate_markers".into(),
                        reason: format!("Marker '{}' is not a valid regex: {e}", marker.tag),
                    })?;
                Matcher::Regex(re)
            }
        };
        Ok(Self {
            tag: marker.tag.clone(),
            matcher,
        })
    }

    fn matches(&self, label: &str, lowered: &str) -> bool {
        match &self.matcher {
            Matcher::Substring(needle) => lowered.contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(label),
        }
    }
}

/// Compiled recap-line rule table.
#[derive(Debug, Clone)]
pub struct DuplicateFilter {
    roots: Vec<String>,
    markers: Vec<CompiledMarker>,
}

impl DuplicateFilter {
    pub fn new(roots: Vec<String>, markers: &[RecapMarker]) -> LedgerInsightsResult<Self> {
        let markers = markers
            .iter()
            .map(CompiledMarker::compile)
            .collect::<LedgerInsightsResult<Vec<_>>>()?;
        Ok(Self { roots, markers })
    }

    pub fn from_config(config: &AnalysisConfig) -> LedgerInsightsResult<Self> {
        Self::new(
            config.bank_fee_duplicate_roots.clone(),
            &config.bank_fee_duplicate_markers,
        )
    }

    /// Tag of the first marker catching `entry`, if it is a recap line.
    pub fn match_marker(&self, entry: &LedgerEntry) -> Option<&str> {
        let class = classify(&entry.account_number);
        let roots = class.roots()?;
        if !roots.has_any_root(&self.roots) {
            return None;
        }
        let lowered = entry.entry_label.to_lowercase();
        self.markers
            .iter()
            .find(|m| m.matches(&entry.entry_label, &lowered))
            .map(|m| m.tag.as_str())
    }

    pub fn filter<'a>(&self, entries: &'a [LedgerEntry]) -> FilteredLedger<'a> {
        let mut out = FilteredLedger {
            kept: Vec::with_capacity(entries.len()),
            removed: Vec::new(),
        };
        for entry in entries {
            match self.match_marker(entry) {
                Some(tag) => {
                    debug!(
                        account = %entry.account_number,
                        label = %entry.entry_label,
                        marker = tag,
                        "dropping bank recap line"
                    );
                    out.removed.push(RemovedEntry {
                        marker: tag.to_string(),
                        entry,
                    });
                }
                None => out.kept.push(entry),
            }
        }
        if !out.removed.is_empty() {
            let net: Decimal = out.removed.iter().map(|r| r.entry.net()).sum();
            warn!(
                removed = out.removed.len(),
                removed_net = %net,
                "bank recap lines removed before aggregation"
            );
        }
        out
    }
}
