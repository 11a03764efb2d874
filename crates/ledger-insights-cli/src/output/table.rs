use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result share one `Field | Value` table; each nested
/// section (balance sheet, ratios, ...) and each list (alerts, monthly
/// activity, charge structure) gets its own titled table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            let (scalars, sections): (Vec<_>, Vec<_>) =
                res_map.iter().partition(|(_, v)| !is_section(v));

            if !scalars.is_empty() {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in scalars {
                    builder.push_record([key.as_str(), &format_value(val)]);
                }
                println!("{}", Table::from(builder));
            }

            for (key, val) in sections {
                println!("\n{}", title(key));
                match val {
                    Value::Array(arr) => print_array_table(arr),
                    other => print_object(other),
                }
            }
        }
        Value::Array(arr) => print_array_table(arr),
        other => println!("{}", format_value(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Nested objects and lists of objects render as their own table.
fn is_section(value: &Value) -> bool {
    match value {
        Value::Object(map) => !is_stage(map),
        Value::Array(arr) => arr.iter().any(Value::is_object),
        _ => false,
    }
}

/// A SIG stage (`{value, is_positive}`) reads better as its bare value.
fn is_stage(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.contains_key("value") && map.contains_key("is_positive")
}

fn title(key: &str) -> String {
    key.replace('_', " ").to_uppercase()
}

fn print_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(map) if is_stage(map) => map
            .get("value")
            .map(format_value)
            .unwrap_or_default(),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
