//! Lenient markup parser built on `quick-xml`.
//!
//! Accepts XHTML and the common HTML looseness found in templates: void
//! elements without a closing slash, valueless attributes, named HTML
//! entities and stray end tags.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{convert_html_entities, decode_entity, escape_stray_markup};
use crate::error::ParseError;
use crate::node::{Attribute, NodeId, NodeKind, is_void_element};
use crate::tree::Tree;

/// An element still waiting for its end tag.
struct OpenElement {
    tag: String,
    /// Where children go: the element itself, or its template content.
    target: NodeId,
}

/// Parse `markup` and append the resulting nodes to `parent`.
pub(crate) fn parse_into(tree: &mut Tree, parent: NodeId, markup: &str) -> Result<(), ParseError> {
    let markup = convert_html_entities(markup);
    let markup = escape_stray_markup(&markup);

    let mut reader = Reader::from_str(&markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    config.allow_dangling_amp = true;

    let mut open: Vec<OpenElement> = Vec::new();

    loop {
        let target = open.last().map_or(parent, |element| element.target);
        match reader.read_event()? {
            Event::Start(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let element = tree.create_element(tag.clone(), decode_attrs(&reader, &e));
                tree.append(target, element);
                if !is_void_element(&tag) {
                    let target = template_target(tree, element);
                    open.push(OpenElement { tag, target });
                }
            }
            Event::Empty(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                let element = tree.create_element(tag, decode_attrs(&reader, &e));
                tree.append(target, element);
            }
            Event::End(e) => {
                let tag = decode_name(&reader, e.name().as_ref());
                // Close the nearest matching element; unmatched end tags are ignored.
                match open.iter().rposition(|element| element.tag == tag) {
                    Some(index) => open.truncate(index),
                    None => tracing::debug!(tag = %tag, "Ignoring unmatched end tag"),
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                tree.append_text(target, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                tree.append_text(target, &decode_entity(&entity));
            }
            Event::CData(e) => {
                tree.append_text(target, &String::from_utf8_lossy(&e));
            }
            Event::Comment(e) => {
                let text = reader.decoder().decode(&e)?.into_owned();
                let comment = tree.push(NodeKind::Comment(text));
                tree.append(target, comment);
            }
            Event::Eof => {
                if !open.is_empty() {
                    tracing::debug!(unclosed = open.len(), "Closing elements left open at end of markup");
                }
                return Ok(());
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }
}

/// Children of a `<template>` go into its content fragment.
fn template_target(tree: &Tree, element: NodeId) -> NodeId {
    match &tree.node(element).kind {
        NodeKind::Element(e) => e.content.unwrap_or(element),
        _ => element,
    }
}

fn decode_name(reader: &Reader<&[u8]>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs(reader: &Reader<&[u8]>, e: &BytesStart) -> Vec<Attribute> {
    e.html_attributes()
        .flatten()
        .map(|attr| {
            let name = decode_name(reader, attr.key.as_ref());
            // Expressions like `a && b` are not valid escapes; keep them raw.
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            Attribute { name, value }
        })
        .collect()
}
