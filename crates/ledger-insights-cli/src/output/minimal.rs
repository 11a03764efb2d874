use serde_json::Value;

/// Print just the headline figure of the output.
///
/// Looks for the headline field of each subcommand in priority order, then
/// falls back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // report/alerts, sig, balance-sheet, ratios, dedup
    let priority_keys = [
        "health_score",
        "net_result",
        "total_assets",
        "net_cash_position",
        "removed_count",
    ];

    if let Value::Object(map) = result_obj {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    match map.get("grade") {
                        Some(Value::String(grade)) => {
                            println!("{} ({})", format_minimal(val), grade)
                        }
                        _ => println!("{}", format_minimal(val)),
                    }
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
