//! Directive-driven template expansion over an in-memory document tree.
//!
//! Templates are ordinary markup annotated with directive attributes and
//! `{expression}` placeholders. The [`Engine`] walks a [`Dom`](weft_dom::Dom),
//! resolves templates (in-document `<template id>` or fetched by URL),
//! resolves data (inline expressions or fetched JSON) and expands the
//! directives in place:
//!
//! | Attribute           | Effect                                              |
//! |---------------------|-----------------------------------------------------|
//! | `template`          | apply the in-document template with this id         |
//! | `template-src`      | fetch and apply a remote template                   |
//! | `template-data-src` | fetch JSON and use it as the context                |
//! | `template-data`     | evaluate an expression and use it as the context    |
//! | `template-foreach`  | repeat the element once per array item              |
//! | `template-if`       | remove the element when the guard is falsy          |
//!
//! Directives are stripped as they are read and never appear in the output.
//! Expression failures, non-success responses and missing templates are
//! logged with `tracing` and degrade locally; only transport failures and
//! malformed JSON data fail the expansion.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use serde_json::json;
//! use weft::{ContainerRef, Engine};
//! use weft_dom::Dom;
//! use weft_fetch::HttpFetcher;
//!
//! let dom = Dom::parse(r#"<template id="row"><li template-foreach="this">{}</li></template>
//!     <body><ul id="list"></ul></body>"#)?;
//! let engine = Engine::new(dom, Rc::new(HttpFetcher::new()));
//!
//! let list = engine
//!     .run(Some("row".into()), Some(ContainerRef::from("list")), Some(json!([1, 2])))
//!     .await?;
//! assert_eq!(engine.dom().inner_html(list), "<li>1</li><li>2</li>");
//! ```

mod apply;
mod context;
mod data;
pub mod directive;
mod engine;
mod error;
mod expand;
mod loader;
mod scan;
mod template;

pub use context::Context;
pub use engine::{ContainerRef, Engine, TemplateRef};
pub use error::EngineError;
pub use expand::Expansion;
pub use template::{PendingTemplate, TemplateDef};
