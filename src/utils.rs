use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Whether a property value equals an allowed vocabulary value.
///
/// Strings compare verbatim. Numbers compare numerically, so `2`, `2.0` and a
/// vocabulary text of `"2"` or `"2.0"` are all equal. Booleans match `true` /
/// `false`. `null`, arrays and objects never match.
pub fn value_matches(allowed: &str, value: &Value) -> bool {
    match value {
        Value::String(text) => text == allowed,
        Value::Number(number) => match (number.as_f64(), allowed.trim().parse::<f64>()) {
            (Some(actual), Ok(expected)) => actual == expected,
            _ => number.to_string() == allowed,
        },
        Value::Bool(flag) => flag.to_string() == allowed,
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

/// Text of a value for log messages. Strings are printed without quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Render a float the way a spreadsheet shows it: integral values lose the `.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// `dir/data.geojson` with prefix `new-` becomes `dir/new-data.geojson`.
pub fn prefixed_path(path: &Path, prefix: &str) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Output: {:?} has no file name to prefix", path))?;
    let mut prefixed = std::ffi::OsString::from(prefix);
    prefixed.push(file_name);
    Ok(path.with_file_name(prefixed))
}
