//! HTML serialization of tree nodes.

use std::fmt::Write;

use crate::node::{NodeId, NodeKind, is_void_element};
use crate::tree::Tree;

pub(crate) fn outer_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::with_capacity(256);
    serialize_node(tree, id, &mut out);
    out
}

pub(crate) fn inner_html(tree: &Tree, id: NodeId) -> String {
    let mut out = String::with_capacity(256);
    serialize_children(tree, id, &mut out);
    out
}

fn serialize_children(tree: &Tree, id: NodeId, out: &mut String) {
    for child in &tree.node(id).children {
        serialize_node(tree, *child, out);
    }
}

fn serialize_node(tree: &Tree, id: NodeId, out: &mut String) {
    match &tree.node(id).kind {
        NodeKind::Document | NodeKind::Fragment => serialize_children(tree, id, out),
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Comment(text) => {
            write!(out, "<!--{text}-->").unwrap();
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for attr in &element.attrs {
                write!(out, r#" {}="{}""#, attr.name, escape_attr(&attr.value)).unwrap();
            }
            out.push('>');

            if is_void_element(&element.tag) {
                return;
            }

            match element.content {
                Some(content) => serialize_children(tree, content, out),
                None => serialize_children(tree, id, out),
            }
            write!(out, "</{}>", element.tag).unwrap();
        }
    }
}

fn escape_text(text: &str) -> String {
    escape_html(text, false)
}

fn escape_attr(text: &str) -> String {
    escape_html(text, true)
}

fn escape_html(text: &str, escape_quotes: bool) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' if escape_quotes => result.push_str("&quot;"),
            _ => result.push(ch),
        }
    }
    result
}
