use serde_json::Value;
use std::io;

use super::{batch_rows, field_pairs, object_rows, scalar_text};

/// Write output as CSV to stdout.
///
/// Batch envelopes become one line per contract; any other envelope becomes
/// a two-column `field,value` listing of its result.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    if let Some(rows) = batch_rows(value) {
        if let Some((headers, lines)) = object_rows(rows) {
            let _ = wtr.write_record(&headers);
            for line in lines {
                let _ = wtr.write_record(&line);
            }
        }
    } else {
        let body = value.get("result").unwrap_or(value);
        match body {
            Value::Object(map) => {
                let _ = wtr.write_record(["field", "value"]);
                for (field, text) in field_pairs(map) {
                    let _ = wtr.write_record([field, text]);
                }
            }
            other => {
                let _ = wtr.write_record([scalar_text(other)]);
            }
        }
    }

    let _ = wtr.flush();
}
