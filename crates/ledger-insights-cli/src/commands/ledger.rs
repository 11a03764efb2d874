use serde_json::{json, Map, Value};

use ledger_insights_core::report::{analyze_ledger, FinancialReport};
use ledger_insights_core::ComputationOutput;

use super::{load_analysis_input, LedgerArgs};

type CommandResult = Result<Value, Box<dyn std::error::Error>>;
type Analysis = Result<ComputationOutput<FinancialReport>, Box<dyn std::error::Error>>;

fn analyze(args: &LedgerArgs) -> Analysis {
    let analysis_input = load_analysis_input(args)?;
    Ok(analyze_ledger(&analysis_input)?)
}

/// Keep the envelope but narrow `result` down to one part of the report.
fn narrow(
    output: ComputationOutput<FinancialReport>,
    pick: impl FnOnce(&FinancialReport) -> Result<Value, serde_json::Error>,
) -> CommandResult {
    let result = pick(&output.result)?;
    let mut envelope = serde_json::to_value(&output)?;
    envelope["result"] = result;
    Ok(envelope)
}

/// Full report in the computation envelope.
pub fn run_report(args: LedgerArgs) -> CommandResult {
    let output = analyze(&args)?;
    Ok(serde_json::to_value(output)?)
}

/// SIG cascade as `stage: value` pairs, in cascade order.
pub fn run_sig(args: LedgerArgs) -> CommandResult {
    narrow(analyze(&args)?, |report| {
        let mut stages = Map::new();
        for (name, stage) in report.sig_cascade.stages() {
            let key = match serde_json::to_value(name)? {
                Value::String(s) => s,
                other => other.to_string(),
            };
            stages.insert(key, serde_json::to_value(stage.value)?);
        }
        Ok(Value::Object(stages))
    })
}

/// Balance-sheet snapshot followed by its derived totals.
pub fn run_balance_sheet(args: LedgerArgs) -> CommandResult {
    narrow(analyze(&args)?, |report| {
        let mut sheet = serde_json::to_value(&report.balance_sheet)?;
        if let (Value::Object(fields), Value::Object(totals)) =
            (&mut sheet, serde_json::to_value(&report.balance_sheet_totals)?)
        {
            fields.extend(totals);
        }
        Ok(sheet)
    })
}

pub fn run_ratios(args: LedgerArgs) -> CommandResult {
    narrow(analyze(&args)?, |report| serde_json::to_value(&report.ratios))
}

/// Score, grade and the triggered alerts.
pub fn run_alerts(args: LedgerArgs) -> CommandResult {
    narrow(analyze(&args)?, |report| {
        Ok(json!({
            "health_score": report.health_score,
            "grade": report.grade,
            "alerts": report.alerts,
        }))
    })
}
