pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use clap::ValueEnum;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The row list of a batch envelope, if `value` is one.
pub(crate) fn batch_rows(value: &Value) -> Option<&Vec<Value>> {
    value.get("result")?.get("results")?.as_array()
}

/// (field, value) pairs with one level of nesting written as `parent.child`.
pub(crate) fn field_pairs(map: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, val) in map {
        match val {
            Value::Object(inner) => {
                for (child, v) in inner {
                    pairs.push((format!("{}.{}", key, child), scalar_text(v)));
                }
            }
            _ => pairs.push((key.clone(), scalar_text(val))),
        }
    }
    pairs
}

/// Column headers from the first object, rows aligned to them.
pub(crate) fn object_rows(arr: &[Value]) -> Option<(Vec<String>, Vec<Vec<String>>)> {
    let Value::Object(first) = arr.first()? else {
        return None;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let rows = arr
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|h| map.get(h).map(scalar_text).unwrap_or_default())
                .collect()
        })
        .collect();
    Some((headers, rows))
}

pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(scalar_text).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_pairs_flatten_one_level() {
        let v = json!({ "price": 1.5, "greeks": { "delta": 0.5, "vega": 2 } });
        let pairs = field_pairs(v.as_object().unwrap());
        assert_eq!(
            pairs,
            vec![
                ("greeks.delta".to_string(), "0.5".to_string()),
                ("greeks.vega".to_string(), "2".to_string()),
                ("price".to_string(), "1.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_object_rows_align_missing_fields() {
        let arr = vec![json!({ "a": 1, "b": null }), json!({ "a": 2 })];
        let (headers, rows) = object_rows(&arr).unwrap();
        assert_eq!(headers, vec!["a", "b"]);
        assert_eq!(rows[0], vec!["1", ""]);
        assert_eq!(rows[1], vec!["2", ""]);
    }

    #[test]
    fn test_batch_rows_detected() {
        let v = json!({ "result": { "results": [ { "index": 0 } ] } });
        assert_eq!(batch_rows(&v).map(Vec::len), Some(1));
        assert!(batch_rows(&json!({ "result": { "price": 1 } })).is_none());
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&json!(null)), "");
        assert_eq!(scalar_text(&json!([0.1, 5])), "0.1, 5");
        assert_eq!(scalar_text(&json!("call")), "call");
    }
}
