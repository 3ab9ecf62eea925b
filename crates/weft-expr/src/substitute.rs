//! `{expression}` substitution in text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::eval::evaluate;
use crate::value::to_display_string;

/// A `{`, then anything but `}`, then `}`. Not nested, not overlapping.
static PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^}]*)\}").expect("invalid substitution regex"));

/// Replace every `{expression}` in `text` with its evaluated, stringified value.
///
/// Expressions that fail to evaluate are replaced by the empty string. Text
/// without a pattern is returned borrowed.
///
/// ```
/// use serde_json::json;
/// use weft_expr::replace;
///
/// let context = json!({"count": 2});
/// assert_eq!(replace("{count} item{count == 1 ? '' : 's'}", &context), "2 items");
/// assert_eq!(replace("plain", &context), "plain");
/// ```
pub fn replace<'a>(text: &'a str, context: &Value) -> Cow<'a, str> {
    PATTERN.replace_all(text, |caps: &Captures| {
        to_display_string(&evaluate(&caps[1], context))
    })
}
