//! Expression language and text substitution for weft templates.
//!
//! Expressions are evaluated by a small interpreter against a JSON context
//! value, so template text can never run host code. The language covers what
//! templates need: field and index access, literals, arithmetic, comparisons,
//! logical operators and the ternary operator.
//!
//! # Evaluation
//!
//! - [`evaluate`] never fails: errors are logged and yield `null`
//! - [`try_evaluate`] reports the [`EvalError`]
//! - a bare identifier reads a field of the context, `this` is the context
//!   itself, and an empty expression evaluates to the context
//!
//! # Substitution
//!
//! [`replace`] rewrites every `{expression}` in a string with the
//! stringified result of evaluating it.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use weft_expr::{evaluate, replace};
//!
//! let context = json!({"user": {"name": "Ada"}, "items": [1, 2, 3]});
//!
//! assert_eq!(evaluate("items.length > 2", &context), json!(true));
//! assert_eq!(replace("Hello, {user.name}!", &context), "Hello, Ada!");
//! ```

mod error;
mod eval;
mod lexer;
mod parser;
mod substitute;
mod value;

pub use error::EvalError;
pub use eval::{evaluate, try_evaluate};
pub use substitute::replace;
pub use value::{is_truthy, to_display_string};
