use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                // Two-column CSV: field, value
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in result {
                    write_rows(&mut wtr, key, val);
                }
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

/// Cost breakdowns nest one level of line items; flatten each line to a
/// `group.item` row.
fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, key: &str, val: &Value) {
    match val {
        Value::Object(map) if map.values().all(|v| !v.is_object() && !v.is_array()) => {
            for (item, amount) in map {
                let _ =
                    wtr.write_record([&format!("{}.{}", key, item), &format_csv_value(amount)]);
            }
        }
        _ => {
            let _ = wtr.write_record([key, &format_csv_value(val)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
