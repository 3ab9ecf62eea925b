//! Document arena and the shared [`Dom`] handle.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ParseError;
use crate::node::{Attribute, Element, NodeData, NodeId, NodeKind};
use crate::{parser, serializer};

/// Arena of nodes. Nodes are never freed; detaching only unlinks them.
#[derive(Debug, Default)]
pub(crate) struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Create an element; `<template>` elements get an empty content fragment.
    pub(crate) fn create_element(&mut self, tag: String, attrs: Vec<Attribute>) -> NodeId {
        let content = tag
            .eq_ignore_ascii_case("template")
            .then(|| self.push(NodeKind::Fragment));
        self.push(NodeKind::Element(Element {
            tag,
            attrs,
            content,
        }))
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    /// Take the nodes to insert: a fragment gives up its children, anything
    /// else is detached from its current parent.
    fn take_insertable(&mut self, node: NodeId) -> Vec<NodeId> {
        if matches!(self.node(node).kind, NodeKind::Fragment) {
            let children = std::mem::take(&mut self.node_mut(node).children);
            for child in &children {
                self.node_mut(*child).parent = None;
            }
            children
        } else {
            self.detach(node);
            vec![node]
        }
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) {
        let nodes = self.take_insertable(node);
        let index = index.min(self.node(parent).children.len());
        for (offset, child) in nodes.iter().enumerate() {
            self.node_mut(*child).parent = Some(parent);
            self.node_mut(parent)
                .children
                .insert(index + offset, *child);
        }
    }

    pub(crate) fn append(&mut self, parent: NodeId, node: NodeId) {
        let len = self.node(parent).children.len();
        self.insert_at(parent, len, node);
    }

    /// Append text, merging with a trailing text node.
    pub(crate) fn append_text(&mut self, parent: NodeId, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(&last) = self.node(parent).children.last()
            && let NodeKind::Text(existing) = &mut self.node_mut(last).kind
        {
            existing.push_str(text);
            return;
        }
        let node = self.push(NodeKind::Text(text.to_owned()));
        self.append(parent, node);
    }

    fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut kind = self.node(id).kind.clone();
        if let NodeKind::Element(element) = &mut kind
            && let Some(content) = element.content
        {
            element.content = Some(self.deep_clone(content));
        }
        let copy = self.push(kind);
        let children = self.node(id).children.clone();
        for child in children {
            let child_copy = self.deep_clone(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Depth-first search below `root`, not entering template content.
    fn find(&self, root: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if id != root && predicate(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }
}

/// Shared handle to a document tree.
///
/// Cloning a `Dom` is cheap and yields another handle to the same tree.
/// The handle is `!Send`: the tree is meant to be driven from one thread by
/// cooperatively scheduled tasks.
#[derive(Clone, Debug)]
pub struct Dom {
    tree: Rc<RefCell<Tree>>,
    document: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        let mut tree = Tree::default();
        let document = tree.push(NodeKind::Document);
        Self {
            tree: Rc::new(RefCell::new(tree)),
            document,
        }
    }

    /// Parse a complete document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the markup cannot be tokenized.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let dom = Self::new();
        parser::parse_into(&mut dom.tree.borrow_mut(), dom.document, markup)?;
        Ok(dom)
    }

    /// Parse markup into a new detached fragment of this document.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the markup cannot be tokenized.
    pub fn parse_fragment(&self, markup: &str) -> Result<NodeId, ParseError> {
        let mut tree = self.tree.borrow_mut();
        let fragment = tree.push(NodeKind::Fragment);
        parser::parse_into(&mut tree, fragment, markup)?;
        Ok(fragment)
    }

    /// The document root node.
    #[must_use]
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// The first `<body>` element, or the document node when there is none.
    #[must_use]
    pub fn body(&self) -> NodeId {
        self.tree
            .borrow()
            .find(self.document, |node| {
                matches!(&node.kind, NodeKind::Element(e) if e.tag.eq_ignore_ascii_case("body"))
            })
            .unwrap_or(self.document)
    }

    /// Find the first attached element whose `id` attribute equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree.borrow().find(self.document, |node| match &node.kind {
            NodeKind::Element(e) => e.attrs.iter().any(|a| a.name == "id" && a.value == id),
            _ => false,
        })
    }

    /// Create a detached element.
    pub fn create_element(&self, tag: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .create_element(tag.to_owned(), Vec::new())
    }

    /// Create a detached text node.
    pub fn create_text(&self, text: &str) -> NodeId {
        self.tree
            .borrow_mut()
            .push(NodeKind::Text(text.to_owned()))
    }

    /// Create an empty fragment.
    pub fn create_fragment(&self) -> NodeId {
        self.tree.borrow_mut().push(NodeKind::Fragment)
    }

    /// Snapshot of a node's kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.tree.borrow().node(id).kind.clone()
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.tree.borrow().node(id).kind, NodeKind::Element(_))
    }

    /// Tag name of an element.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Element(element) => Some(element.tag.clone()),
            _ => None,
        }
    }

    /// Content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<String> {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Text(text) => Some(text.clone()),
            _ => None,
        }
    }

    /// Replace the content of a text node. Other nodes are left untouched.
    pub fn set_text(&self, id: NodeId, text: String) {
        let mut tree = self.tree.borrow_mut();
        if let NodeKind::Text(existing) = &mut tree.node_mut(id).kind {
            *existing = text;
        }
    }

    /// Parent of a node, `None` when detached or a root.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(id).parent
    }

    /// All children in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.borrow().node(id).children.clone()
    }

    /// Element children in order.
    #[must_use]
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children_where(id, |kind| matches!(kind, NodeKind::Element(_)))
    }

    /// Text children in order.
    #[must_use]
    pub fn text_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children_where(id, |kind| matches!(kind, NodeKind::Text(_)))
    }

    fn children_where(&self, id: NodeId, keep: impl Fn(&NodeKind) -> bool) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.node(id)
            .children
            .iter()
            .copied()
            .filter(|child| keep(&tree.node(*child).kind))
            .collect()
    }

    /// Content fragment of a `<template>` element.
    #[must_use]
    pub fn template_content(&self, id: NodeId) -> Option<NodeId> {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Element(element) => element.content,
            _ => None,
        }
    }

    /// Value of an attribute.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Element(element) => element
                .attrs
                .iter()
                .find(|attr| attr.name == name)
                .map(|attr| attr.value.clone()),
            _ => None,
        }
    }

    /// Whether an element carries an attribute.
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Element(element) => element.attrs.iter().any(|attr| attr.name == name),
            _ => false,
        }
    }

    /// Attributes in order. Empty for non-elements.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> Vec<Attribute> {
        match &self.tree.borrow().node(id).kind {
            NodeKind::Element(element) => element.attrs.clone(),
            _ => Vec::new(),
        }
    }

    /// Set an attribute, keeping its position when it already exists.
    pub fn set_attribute(&self, id: NodeId, name: &str, value: String) {
        let mut tree = self.tree.borrow_mut();
        let Some(element) = tree.element_mut(id) else {
            return;
        };
        match element.attrs.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => attr.value = value,
            None => element.attrs.push(Attribute::new(name, value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let mut tree = self.tree.borrow_mut();
        let element = tree.element_mut(id)?;
        let index = element.attrs.iter().position(|attr| attr.name == name)?;
        Some(element.attrs.remove(index).value)
    }

    /// Append `child` to `parent`. A fragment moves its children instead.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.tree.borrow_mut().append(parent, child);
    }

    /// Insert `node` right after `reference`. A fragment moves its children.
    ///
    /// Does nothing when `reference` is detached.
    pub fn insert_after(&self, reference: NodeId, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if node == reference {
            return;
        }
        // Detach first so the reference index is computed on the final list.
        if !matches!(tree.node(node).kind, NodeKind::Fragment) {
            tree.detach(node);
        }
        let Some(parent) = tree.node(reference).parent else {
            return;
        };
        let Some(index) = tree
            .node(parent)
            .children
            .iter()
            .position(|child| *child == reference)
        else {
            return;
        };
        tree.insert_at(parent, index + 1, node);
    }

    /// Detach a node from its parent.
    pub fn detach(&self, id: NodeId) {
        self.tree.borrow_mut().detach(id);
    }

    /// Replace all children of `parent` with `node` (or a fragment's children).
    pub fn replace_children(&self, parent: NodeId, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        let old = std::mem::take(&mut tree.node_mut(parent).children);
        for child in old {
            tree.node_mut(child).parent = None;
        }
        tree.append(parent, node);
    }

    /// Deep-clone a node, including template content. The clone is detached.
    pub fn clone_node(&self, id: NodeId) -> NodeId {
        self.tree.borrow_mut().deep_clone(id)
    }

    /// Serialize the node itself and its subtree as HTML.
    #[must_use]
    pub fn outer_html(&self, id: NodeId) -> String {
        serializer::outer_html(&self.tree.borrow(), id)
    }

    /// Serialize the children of a node as HTML.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        serializer::inner_html(&self.tree.borrow(), id)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(markup: &str) -> Dom {
        Dom::parse(markup).unwrap()
    }

    #[test]
    fn test_body_falls_back_to_document() {
        let dom = parse("<div>x</div>");
        assert_eq!(dom.body(), dom.document());
    }

    #[test]
    fn test_body_found() {
        let dom = parse("<html><body><p>x</p></body></html>");
        assert_eq!(dom.tag_name(dom.body()).as_deref(), Some("body"));
    }

    #[test]
    fn test_remove_attribute_twice() {
        let dom = parse(r#"<div template-if="ok"></div>"#);
        let div = dom.element_children(dom.document())[0];

        assert_eq!(dom.remove_attribute(div, "template-if").as_deref(), Some("ok"));
        assert_eq!(dom.remove_attribute(div, "template-if"), None);
        assert!(!dom.has_attribute(div, "template-if"));
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let dom = parse(r#"<a href="x" title="t"></a>"#);
        let a = dom.element_children(dom.document())[0];
        dom.set_attribute(a, "href", "y".to_owned());
        dom.set_attribute(a, "rel", "next".to_owned());

        assert_eq!(dom.outer_html(a), r#"<a href="y" title="t" rel="next"></a>"#);
    }

    #[test]
    fn test_insert_after_moves_fragment_children() {
        let dom = parse("<ul><li>a</li><li>d</li></ul>");
        let ul = dom.element_children(dom.document())[0];
        let first = dom.element_children(ul)[0];

        let fragment = dom.parse_fragment("<li>b</li><li>c</li>").unwrap();
        dom.insert_after(first, fragment);

        assert_eq!(dom.inner_html(ul), "<li>a</li><li>b</li><li>c</li><li>d</li>");
        assert!(dom.children(fragment).is_empty());
    }

    #[test]
    fn test_insert_after_detached_reference_is_noop() {
        let dom = Dom::new();
        let reference = dom.create_element("p");
        let node = dom.create_element("span");
        dom.insert_after(reference, node);
        assert_eq!(dom.parent(node), None);
    }

    #[test]
    fn test_detach() {
        let dom = parse("<div><p>a</p><p>b</p></div>");
        let div = dom.element_children(dom.document())[0];
        let first = dom.element_children(div)[0];

        dom.detach(first);

        assert_eq!(dom.parent(first), None);
        assert_eq!(dom.inner_html(div), "<p>b</p>");
    }

    #[test]
    fn test_replace_children() {
        let dom = parse("<div><p>old</p>text</div>");
        let div = dom.element_children(dom.document())[0];
        let fragment = dom.parse_fragment("<span>new</span>").unwrap();

        dom.replace_children(div, fragment);

        assert_eq!(dom.inner_html(div), "<span>new</span>");
    }

    #[test]
    fn test_clone_node_is_deep_and_independent() {
        let dom = parse(r#"<div class="a"><b>x</b></div>"#);
        let div = dom.element_children(dom.document())[0];
        let copy = dom.clone_node(div);

        dom.set_attribute(copy, "class", "b".to_owned());
        let bold = dom.element_children(copy)[0];
        dom.set_text(dom.children(bold)[0], "y".to_owned());

        assert_eq!(dom.outer_html(div), r#"<div class="a"><b>x</b></div>"#);
        assert_eq!(dom.outer_html(copy), r#"<div class="b"><b>y</b></div>"#);
        assert_eq!(dom.parent(copy), None);
    }

    #[test]
    fn test_clone_template_clones_content() {
        let dom = parse(r#"<template id="t"><p>x</p></template>"#);
        let template = dom.element_by_id("t").unwrap();
        let copy = dom.clone_node(template);

        assert_ne!(dom.template_content(copy), dom.template_content(template));
        assert_eq!(dom.outer_html(copy), r#"<template id="t"><p>x</p></template>"#);
    }

    #[test]
    fn test_element_by_id_skips_template_content() {
        let dom = parse(r#"<template id="t"><p id="inner"></p></template><p id="outer"></p>"#);
        assert!(dom.element_by_id("inner").is_none());
        assert!(dom.element_by_id("outer").is_some());
    }

    #[test]
    fn test_children_filters() {
        let dom = parse("<div>a<b>b</b>c<!-- note --></div>");
        let div = dom.element_children(dom.document())[0];
        assert_eq!(dom.children(div).len(), 4);
        assert_eq!(dom.element_children(div).len(), 1);
        assert_eq!(dom.text_children(div).len(), 2);
    }
}
