//! Reusable field validators
//!
//! Every validator receives the external field name and the (already filtered)
//! value, and returns the failure reason. Values of a type the validator does
//! not apply to pass through; type checks are done by the field type.

use crate::core::field::FieldFormat;
use serde_json::Value;

/// Validator: number must be at least `min`
pub fn min_value(min: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_f64() {
        Some(num) if num < min => Err(format!("Value must be at least {}", min)),
        _ => Ok(()),
    }
}

/// Validator: number must not exceed `max`
pub fn max_value(max: f64) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_f64() {
        Some(num) if num > max => Err(format!("Value must be at most {}", max)),
        _ => Ok(()),
    }
}

/// Validator: string length (in characters) must be within range
pub fn string_length(
    min: usize,
    max: usize,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        if len < min {
            Err(format!(
                "Value must be at least {} characters long (got {})",
                min, len
            ))
        } else if len > max {
            Err(format!(
                "Value must be at most {} characters long (got {})",
                max, len
            ))
        } else {
            Ok(())
        }
    }
}

/// Validator: value must be in allowed list
pub fn in_list(
    allowed: Vec<String>,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
            "Value must be one of: {} (got '{}')",
            allowed.join(", "),
            s
        )),
        _ => Ok(()),
    }
}

/// Validator: date must match format
pub fn date_format(
    format: &'static str,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if chrono::NaiveDate::parse_from_str(s, format).is_err() => Err(format!(
            "Value must be a date in the format {} (got '{}')",
            format, s
        )),
        _ => Ok(()),
    }
}

/// Validator: string must match a [`FieldFormat`]
pub fn string_format(
    format: FieldFormat,
) -> impl Fn(&str, &Value) -> Result<(), String> + Send + Sync + Clone {
    move |_: &str, value: &Value| match value.as_str() {
        Some(s) if !format.validate(s) => Err(match &format {
            FieldFormat::Custom(regex) => {
                format!("Value does not match the pattern {}", regex.as_str())
            }
            other => format!("Value is not a valid {}", other.name()),
        }),
        _ => Ok(()),
    }
}
