//! Node types stored in the document arena.

/// Handle to a node inside a [`Dom`](crate::Dom).
///
/// Handles are only meaningful for the `Dom` that minted them. Detached nodes
/// remain addressable for the lifetime of the `Dom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Element attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written in the markup.
    pub name: String,
    /// Attribute value (entities decoded).
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Element payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    /// Attributes in source order.
    pub attrs: Vec<Attribute>,
    /// Inert content fragment, present only for `<template>` elements.
    pub content: Option<NodeId>,
}

impl Element {
    /// Whether this element is a `<template>`.
    #[must_use]
    pub fn is_template(&self) -> bool {
        self.tag.eq_ignore_ascii_case("template")
    }
}

/// What a node is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root.
    Document,
    /// Parentless container whose children move on insertion.
    Fragment,
    /// Element with tag and attributes.
    Element(Element),
    /// Character data.
    Text(String),
    /// Comment.
    Comment(String),
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Check whether `tag` names an HTML void element.
pub(crate) fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(tag))
}
