use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, is_record_list, result_of, scalar};

/// Format output as tables: scalar fields in one Field/Value table, each
/// list of records (cascade, tranche returns, stress points...) in its own.
pub fn print_table(value: &Value) {
    let result = result_of(value);
    match result {
        Value::Object(map) => print_object(map),
        Value::Array(arr) => print_records("", arr),
        other => println!("{}", scalar(other)),
    }

    if let Value::Object(envelope) = value {
        print_footer(envelope);
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut pairs = Vec::new();
    flatten("", &Value::Object(map.clone()), &mut pairs);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut lists = Vec::new();
    for (key, val) in pairs {
        if is_record_list(&val) {
            lists.push((key, val));
        } else {
            builder.push_record([key, scalar(&val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in lists {
        if let Value::Array(arr) = val {
            print_records(&key, &arr);
        }
    }
}

fn print_records(title: &str, arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }
    if !title.is_empty() {
        println!("\n{}:", title);
    }

    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            println!("{}", scalar(item));
        }
        return;
    };

    let mut first_flat = Vec::new();
    flatten("", &Value::Object(first.clone()), &mut first_flat);
    let headers: Vec<String> = first_flat.into_iter().map(|(k, _)| k).collect();

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in arr {
        let mut flat = Vec::new();
        flatten("", item, &mut flat);
        let row: Vec<String> = headers
            .iter()
            .map(|h| {
                flat.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| scalar(v))
                    .unwrap_or_default()
            })
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", scalar(w));
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
