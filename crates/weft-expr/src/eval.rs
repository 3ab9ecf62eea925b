//! Expression evaluation against a context value.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::EvalError;
use crate::parser::{BinaryOp, Expr, LogicalOp, UnaryOp, parse};
use crate::value::{is_truthy, loose_equals, number, strict_equals, to_display_string, to_number};

/// Evaluate `expression` with `context` as the implicit receiver.
///
/// Failures are logged and yield `null`; nothing is propagated to the caller.
///
/// ```
/// use serde_json::json;
/// use weft_expr::evaluate;
///
/// assert_eq!(evaluate("price * qty", &json!({"price": 2, "qty": 3})), json!(6));
/// assert_eq!(evaluate("missing.field", &json!({})), json!(null));
/// ```
pub fn evaluate(expression: &str, context: &Value) -> Value {
    match try_evaluate(expression, context) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                expression = %expression,
                context = %context,
                error = %e,
                "Failed to evaluate expression"
            );
            Value::Null
        }
    }
}

/// Evaluate `expression`, reporting parse and runtime failures.
///
/// An empty or whitespace-only expression evaluates to the context itself.
pub fn try_evaluate(expression: &str, context: &Value) -> Result<Value, EvalError> {
    if expression.trim().is_empty() {
        return Ok(context.clone());
    }
    let expr = parse(expression)?;
    eval(&expr, context)
}

fn eval(expr: &Expr, context: &Value) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::This => Ok(context.clone()),
        Expr::Ident(name) => property(context, name),
        Expr::Member {
            object,
            property: name,
            optional,
        } => {
            let object = eval(object, context)?;
            if *optional && object.is_null() {
                return Ok(Value::Null);
            }
            property(&object, name)
        }
        Expr::Index {
            object,
            index,
            optional,
        } => {
            let object = eval(object, context)?;
            if *optional && object.is_null() {
                return Ok(Value::Null);
            }
            let index = eval(index, context)?;
            element(&object, &index)
        }
        Expr::Unary(op, operand) => {
            let value = eval(operand, context)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!is_truthy(&value)),
                UnaryOp::Neg => number(-to_number(&value)),
                UnaryOp::Plus => number(to_number(&value)),
            })
        }
        Expr::Binary(op, left, right) => {
            let left = eval(left, context)?;
            let right = eval(right, context)?;
            Ok(binary(*op, &left, &right))
        }
        Expr::Logical(op, left, right) => {
            let left = eval(left, context)?;
            let short_circuit = match op {
                LogicalOp::And => !is_truthy(&left),
                LogicalOp::Or => is_truthy(&left),
                LogicalOp::Coalesce => !left.is_null(),
            };
            if short_circuit {
                Ok(left)
            } else {
                eval(right, context)
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if is_truthy(&eval(test, context)?) {
                eval(consequent, context)
            } else {
                eval(alternate, context)
            }
        }
        Expr::Array(items) => items
            .iter()
            .map(|item| eval(item, context))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Object(properties) => {
            let mut map = Map::new();
            for (key, value) in properties {
                map.insert(key.clone(), eval(value, context)?);
            }
            Ok(Value::Object(map))
        }
    }
}

/// Read a named property. Missing properties are `null`; reading from `null` fails.
fn property(object: &Value, name: &str) -> Result<Value, EvalError> {
    match object {
        Value::Null => Err(EvalError::NullAccess(name.to_owned())),
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
        Value::Array(items) if name == "length" => Ok(Value::from(items.len())),
        Value::String(s) if name == "length" => Ok(Value::from(s.chars().count())),
        Value::Array(items) => Ok(name
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index))
            .cloned()
            .unwrap_or(Value::Null)),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(Value::Null),
    }
}

/// Read `object[index]`: numeric indexes address array items and characters.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn element(object: &Value, index: &Value) -> Result<Value, EvalError> {
    let position = index
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0)
        .map(|f| f as usize);
    match (object, position) {
        (Value::Array(items), Some(i)) => Ok(items.get(i).cloned().unwrap_or(Value::Null)),
        (Value::String(s), Some(i)) => Ok(s
            .chars()
            .nth(i)
            .map_or(Value::Null, |c| Value::String(c.to_string()))),
        _ => property(object, &to_display_string(index)),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            if left.is_string() || right.is_string() {
                let mut joined = to_display_string(left);
                joined.push_str(&to_display_string(right));
                Value::String(joined)
            } else {
                number(to_number(left) + to_number(right))
            }
        }
        BinaryOp::Sub => number(to_number(left) - to_number(right)),
        BinaryOp::Mul => number(to_number(left) * to_number(right)),
        BinaryOp::Div => number(to_number(left) / to_number(right)),
        BinaryOp::Rem => number(to_number(left) % to_number(right)),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(loose_equals(left, right)),
        BinaryOp::Ne => Value::Bool(!loose_equals(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_equals(left, right)),
        BinaryOp::StrictNe => Value::Bool(!strict_equals(left, right)),
    }
}

/// Strings compare lexicographically, everything else numerically.
/// `None` when either side is not a number (`NaN`).
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}
