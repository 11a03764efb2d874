use serde_json::{json, Value};

use ledger_insights_core::ledger::dedup::DuplicateFilter;

use super::{effective_config, load_analysis_input, LedgerArgs};

/// Bank recap lines the filter would drop, with their totals.
pub fn run_dedup(args: LedgerArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis_input = load_analysis_input(&args)?;
    let config = effective_config(&analysis_input);
    config.validate()?;
    let filter = DuplicateFilter::from_config(&config)?;

    let filtered = filter.filter(&analysis_input.entries);
    let summary = filtered.summary();
    let removed: Vec<Value> = filtered
        .removed
        .iter()
        .map(|r| {
            json!({
                "marker": r.marker,
                "entry_date": r.entry.entry_date,
                "account_number": r.entry.account_number,
                "entry_label": r.entry.entry_label,
                "debit": r.entry.debit,
                "credit": r.entry.credit,
            })
        })
        .collect();

    Ok(json!({
        "result": {
            "fiscal_year": analysis_input.fiscal_year,
            "entry_count": analysis_input.entries.len(),
            "kept_count": filtered.kept.len(),
            "removed_count": summary.removed_count,
            "removed_debit": summary.removed_debit,
            "removed_credit": summary.removed_credit,
            "removed_net": summary.removed_net,
            "by_marker": summary.by_marker,
            "removed": removed,
        },
        "methodology": "Label markers matched on the configured bank-fee roots",
    }))
}
