//! Directive attributes and their extraction.
//!
//! Every directive is removed from the element as it is read, so a node that
//! is expanded again never re-triggers it and no directive reaches the
//! rendered output.

use weft_dom::{Dom, NodeId};

/// In-document template id to apply to the element.
pub const TEMPLATE: &str = "template";
/// URL of a remote template to apply to the element.
pub const TEMPLATE_SRC: &str = "template-src";
/// Expression whose value becomes the element's context.
pub const TEMPLATE_DATA: &str = "template-data";
/// URL of remote JSON that becomes the element's context.
pub const TEMPLATE_DATA_SRC: &str = "template-data-src";
/// Expression yielding the array the element is repeated for.
pub const TEMPLATE_FOREACH: &str = "template-foreach";
/// Guard expression; a falsy value removes the element.
pub const TEMPLATE_IF: &str = "template-if";

/// Read an attribute and delete it from the element.
///
/// Returns the previous value. A second call for the same name sees `None`.
pub fn consume_attribute(dom: &Dom, element: NodeId, name: &str) -> Option<String> {
    dom.remove_attribute(element, name)
}

/// `template-data-src` and `template-data`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct DataDirectives {
    pub(crate) src: Option<String>,
    pub(crate) expression: Option<String>,
}

impl DataDirectives {
    pub(crate) fn consume(dom: &Dom, element: NodeId) -> Self {
        Self {
            src: consume_attribute(dom, element, TEMPLATE_DATA_SRC),
            expression: consume_attribute(dom, element, TEMPLATE_DATA),
        }
    }
}

/// Directives handled by the element expander before template resolution.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ElementDirectives {
    pub(crate) guard: Option<String>,
    pub(crate) data: DataDirectives,
    pub(crate) foreach: Option<String>,
}

impl ElementDirectives {
    /// Strip the guard, data and iteration directives.
    ///
    /// `template` and `template-src` stay on the element so that iteration
    /// clones still carry them.
    pub(crate) fn consume(dom: &Dom, element: NodeId) -> Self {
        Self {
            guard: consume_attribute(dom, element, TEMPLATE_IF),
            data: DataDirectives::consume(dom, element),
            foreach: consume_attribute(dom, element, TEMPLATE_FOREACH),
        }
    }
}

/// Template reference declared by an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateDirective {
    Id(String),
    Src(String),
}

impl TemplateDirective {
    /// Strip both template directives; `template` wins when both are present.
    pub(crate) fn consume(dom: &Dom, element: NodeId) -> Option<Self> {
        let id = consume_attribute(dom, element, TEMPLATE);
        let src = consume_attribute(dom, element, TEMPLATE_SRC);
        id.map(Self::Id).or_else(|| src.map(Self::Src))
    }
}

/// Whether the element carries a directive only the expander handles.
pub(crate) fn has_expander_directive(dom: &Dom, element: NodeId) -> bool {
    dom.has_attribute(element, TEMPLATE_IF) || dom.has_attribute(element, TEMPLATE_FOREACH)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element(markup: &str) -> (Dom, NodeId) {
        let dom = Dom::parse(markup).unwrap();
        let node = dom.element_children(dom.document())[0];
        (dom, node)
    }

    #[test]
    fn test_consume_attribute_twice() {
        let (dom, div) = element(r#"<div template-if="ok" class="c"></div>"#);
        assert_eq!(
            consume_attribute(&dom, div, TEMPLATE_IF).as_deref(),
            Some("ok")
        );
        assert_eq!(consume_attribute(&dom, div, TEMPLATE_IF), None);
        assert_eq!(dom.outer_html(div), r#"<div class="c"></div>"#);
    }

    #[test]
    fn test_element_directives_keep_template() {
        let (dom, li) = element(
            r#"<li template-if="a" template-data="b" template-data-src="/c" template-foreach="d" template="t"></li>"#,
        );
        let directives = ElementDirectives::consume(&dom, li);
        assert_eq!(
            directives,
            ElementDirectives {
                guard: Some("a".to_owned()),
                data: DataDirectives {
                    src: Some("/c".to_owned()),
                    expression: Some("b".to_owned()),
                },
                foreach: Some("d".to_owned()),
            }
        );
        assert_eq!(dom.outer_html(li), r#"<li template="t"></li>"#);
    }

    #[test]
    fn test_template_directive_consumes_both() {
        let (dom, div) = element(r#"<div template="card" template-src="/card.html"></div>"#);
        assert_eq!(
            TemplateDirective::consume(&dom, div),
            Some(TemplateDirective::Id("card".to_owned()))
        );
        assert_eq!(dom.outer_html(div), "<div></div>");
        assert_eq!(TemplateDirective::consume(&dom, div), None);
    }

    #[test]
    fn test_template_src_alone() {
        let (dom, div) = element(r#"<div template-src="/card.html"></div>"#);
        assert_eq!(
            TemplateDirective::consume(&dom, div),
            Some(TemplateDirective::Src("/card.html".to_owned()))
        );
    }

    #[test]
    fn test_directive_names_are_case_sensitive() {
        let (dom, div) = element(r#"<div Template-If="false"></div>"#);
        assert!(!has_expander_directive(&dom, div));
        assert_eq!(consume_attribute(&dom, div, TEMPLATE_IF), None);
    }
}
