use serde_json::Value;
use std::io;

use super::{flatten, result_of, scalar};

/// Write output as CSV to stdout. Lists become one row per record; objects
/// become `field,value` rows with dotted field names.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let written = match result_of(value) {
        Value::Array(arr) => write_records(&mut wtr, arr),
        other => write_fields(&mut wtr, other),
    };
    if let Err(e) = written.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> Result<(), csv::Error> {
    let mut pairs = Vec::new();
    flatten("", value, &mut pairs);
    wtr.write_record(["field", "value"])?;
    for (key, val) in pairs {
        wtr.write_record([key, scalar(&val)])?;
    }
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> Result<(), csv::Error> {
    let Some(first) = arr.first() else {
        return Ok(());
    };
    let mut first_flat = Vec::new();
    flatten("", first, &mut first_flat);
    let headers: Vec<String> = first_flat.into_iter().map(|(k, _)| k).collect();
    wtr.write_record(&headers)?;

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
        wtr.write_record(&row)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        match value {
            Value::Array(arr) => write_records(&mut wtr, arr).unwrap(),
            other => write_fields(&mut wtr, other).unwrap(),
        }
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_records_share_first_row_headers() {
        // serde_json maps are key-sorted
        let rows = json!([
            { "multiplier": "1", "compliant": true },
            { "multiplier": "2", "compliant": false },
        ]);
        assert_eq!(render(&rows), "compliant,multiplier\ntrue,1\nfalse,2\n");
    }

    #[test]
    fn test_nested_fields_are_dotted() {
        let obj = json!({ "issuance": { "headroom": "10" } });
        assert_eq!(render(&obj), "field,value\nissuance.headroom,10\n");
    }
}
