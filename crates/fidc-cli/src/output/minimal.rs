use serde_json::Value;

use super::{result_of, scalar};

/// Dotted paths tried in order; the first non-null one is printed.
const PRIORITY_PATHS: &[&str] = &[
    "yearly.junior_return",
    "junior_return",
    "required_yield_for_target",
    "breakeven_yield",
    "final_rating",
    "rupture_multiple",
    "operation.net_monthly",
    "net_monthly",
    "total_junior_result",
    "junior_residual",
    "saved",
    "deleted",
];

/// Print just the headline value of the output.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for path in PRIORITY_PATHS {
            if let Some(val) = lookup(result, path).filter(|v| !v.is_null()) {
                return scalar(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, scalar(val));
        }
    }

    // Lists print their length; a bare scalar prints as-is.
    match result {
        Value::Array(arr) => format!("{} rows", arr.len()),
        other => scalar(other),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_report_headline_is_annual_junior_return() {
        let out = json!({ "result": {
            "net_asset_value": "40000000",
            "yearly": { "junior_return": "0.5414" },
        }});
        assert_eq!(headline(&out), "0.5414");
    }

    #[test]
    fn test_null_target_falls_through_to_breakeven() {
        let out = json!({ "result": {
            "required_yield_for_target": null,
            "breakeven_yield": "0.0109",
        }});
        assert_eq!(headline(&out), "0.0109");
    }

    #[test]
    fn test_lists_and_unknown_objects() {
        assert_eq!(headline(&json!({ "result": [{ "a": 1 }, { "a": 2 }] })), "2 rows");
        assert_eq!(headline(&json!({ "result": { "other": 3 } })), "other: 3");
    }
}
