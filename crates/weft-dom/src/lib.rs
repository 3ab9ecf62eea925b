//! Mutable in-memory document tree for template expansion.
//!
//! This crate provides a [`Dom`] handle over an arena of nodes. Nodes are
//! addressed by [`NodeId`] and every operation borrows the arena only for its
//! own duration, so a `Dom` can be shared between cooperatively scheduled
//! tasks that work on disjoint subtrees.
//!
//! # Architecture
//!
//! - [`Dom`]: shared handle with creation, traversal and mutation primitives
//! - markup parsing built on `quick-xml`, tolerant of HTML void elements and
//!   mismatched end tags
//! - HTML serialization via [`Dom::outer_html`] / [`Dom::inner_html`]
//!
//! `<template>` elements keep their content in a separate fragment (see
//! [`Dom::template_content`]). That content is inert: it is not a child of
//! the element, so tree walks never enter it.
//!
//! # Example
//!
//! ```
//! use weft_dom::Dom;
//!
//! let dom = Dom::parse(r#"<body><p class="note">Hello</p></body>"#).unwrap();
//! let body = dom.body();
//! let p = dom.element_children(body)[0];
//!
//! assert_eq!(dom.attribute(p, "class").as_deref(), Some("note"));
//! dom.remove_attribute(p, "class");
//! assert_eq!(dom.inner_html(body), "<p>Hello</p>");
//! ```

mod entities;
mod error;
mod node;
mod parser;
mod serializer;
mod tree;

pub use error::ParseError;
pub use node::{Attribute, Element, NodeId, NodeKind};
pub use tree::Dom;
