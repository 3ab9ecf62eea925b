//! Value coercions: truthiness, numbers and display strings.

use serde_json::{Number, Value};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Build a JSON number, preferring the integer form.
///
/// Non-finite results (`NaN`, infinities) have no JSON form and become `null`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// Numeric coercion: `null` is 0, booleans are 0/1, strings are parsed.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Truthiness: `null`, `false`, `0` and `""` are falsy, everything else is truthy.
///
/// ```
/// use serde_json::json;
/// use weft_expr::is_truthy;
///
/// assert!(!is_truthy(&json!(0)));
/// assert!(is_truthy(&json!([])));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form used when substituting a value into markup.
///
/// `null` renders as the empty string, integral numbers without a fraction,
/// arrays as their items joined by `,` and objects as JSON.
///
/// ```
/// use serde_json::json;
/// use weft_expr::to_display_string;
///
/// assert_eq!(to_display_string(&json!(5.0)), "5");
/// assert_eq!(to_display_string(&json!([1, "a", null])), "1,a,");
/// assert_eq!(to_display_string(&json!(null)), "");
/// ```
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// `===`: same type and value. Numbers compare numerically.
pub(crate) fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// `==`: like `===`, but numbers, numeric strings and booleans compare as numbers.
#[allow(clippy::float_cmp)]
pub(crate) fn loose_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_) | Value::Bool(_), Value::String(_) | Value::Bool(_) | Value::Number(_))
        | (Value::String(_), Value::Number(_) | Value::Bool(_)) => {
            to_number(left) == to_number(right)
        }
        _ => strict_equals(left, right),
    }
}
