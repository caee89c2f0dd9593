use serde_json::Value;

// Walks `path` from `value`; a JSON null at the end counts as absent.
pub(crate) fn pick_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    if current.is_null() { None } else { Some(current) }
}

pub(crate) fn pick_first<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    paths.iter().find_map(|path| pick_path(value, path))
}

/// Relations arrive either as a bare array or wrapped as `{ "data": [...] }`.
pub(crate) fn relation_list(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        Some(Value::Object(map)) => match map.get("data") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn as_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                Some(int.to_string())
            } else if let Some(int) = n.as_u64() {
                Some(int.to_string())
            } else {
                n.as_f64().map(format_number)
            }
        }
        _ => None,
    }
}

pub(crate) fn as_finite_f64(value: &Value) -> Option<f64> {
    as_finite_f64_depth(value, 2)
}

fn as_finite_f64_depth(value: &Value, depth: u8) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Object(map) if depth > 0 => ["total", "value"]
            .iter()
            .find_map(|key| map.get(*key).filter(|v| !v.is_null()))
            .and_then(|inner| as_finite_f64_depth(inner, depth - 1)),
        _ => None,
    }
}

pub(crate) fn as_trimmed_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoids printing "-0".
        return "0".to_string();
    }
    format!("{value}")
}
