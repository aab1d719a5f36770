//! Permissive field decoders for commerce API payloads.
//!
//! The store API is not strict about JSON types: amounts arrive as numbers or
//! numeric strings, ids sometimes as strings, and any field may be `null`.
//! These helpers never fail on a wrong type; they fall back to the zero value.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode a number from a JSON number or numeric string. Anything else is `0.0`.
pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// Decode an integer id from a JSON number or numeric string. Anything else is `0`.
pub fn integer<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}

/// Decode a string; numbers and booleans are rendered, `null` becomes empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(cell_text(&value))
}

/// Decode a list of strings; a bare string becomes a one-element list.
pub fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().map(cell_text).collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

/// Render a loosely-typed JSON value the way it appears in a spreadsheet cell.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "number")]
        amount: f64,
        #[serde(default, deserialize_with = "integer")]
        id: i64,
        #[serde(default, deserialize_with = "text")]
        label: String,
        #[serde(default, deserialize_with = "text_list")]
        lines: Vec<String>,
    }

    #[test]
    fn test_accepts_numeric_strings() {
        let probe: Probe = serde_json::from_value(json!({
            "amount": "12.50",
            "id": "42",
            "label": 7,
            "lines": ["a", 1]
        }))
        .unwrap();

        assert_eq!(probe.amount, 12.5);
        assert_eq!(probe.id, 42);
        assert_eq!(probe.label, "7");
        assert_eq!(probe.lines, vec!["a".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_null_and_missing_default() {
        let probe: Probe = serde_json::from_value(json!({
            "amount": null,
            "label": null,
            "lines": null
        }))
        .unwrap();

        assert_eq!(probe.amount, 0.0);
        assert_eq!(probe.id, 0);
        assert_eq!(probe.label, "");
        assert!(probe.lines.is_empty());
    }

    #[test]
    fn test_garbage_falls_back_to_zero() {
        let probe: Probe = serde_json::from_value(json!({
            "amount": "n/a",
            "id": {"nested": true}
        }))
        .unwrap();

        assert_eq!(probe.amount, 0.0);
        assert_eq!(probe.id, 0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(99.5), "99.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-3.0), "-3");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!("x")), "x");
        assert_eq!(cell_text(&json!(5)), "5");
        assert_eq!(cell_text(&json!(true)), "true");
    }
}
