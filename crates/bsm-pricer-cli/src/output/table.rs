use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{batch_rows, field_pairs, object_rows, scalar_text};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    if let Some(rows) = batch_rows(value) {
        print_rows(rows);
    } else {
        match value.get("result").unwrap_or(value) {
            Value::Object(map) => {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (field, text) in field_pairs(map) {
                    builder.push_record([field, text]);
                }
                println!("{}", Table::from(builder));
            }
            other => println!("{}", scalar_text(other)),
        }
    }

    print_footer(value);
}

fn print_rows(rows: &[Value]) {
    let Some((headers, lines)) = object_rows(rows) else {
        println!("(empty)");
        return;
    };
    let mut builder = Builder::default();
    builder.push_record(headers);
    for line in lines {
        builder.push_record(line);
    }
    println!("{}", Table::from(builder));
}

fn print_footer(value: &Value) {
    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
