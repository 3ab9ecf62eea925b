//! Template definitions and their resolution.

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use weft_dom::{Dom, NodeId};

use crate::directive::TemplateDirective;
use crate::engine::Engine;
use crate::error::EngineError;

/// Inert fragment that template applications clone.
///
/// The content is never part of the rendered tree and is never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDef {
    content: NodeId,
}

impl TemplateDef {
    /// Wrap a fragment (or `<template>` content) as a definition.
    #[must_use]
    pub fn new(content: NodeId) -> Self {
        Self { content }
    }

    /// A definition with no content.
    #[must_use]
    pub fn empty(dom: &Dom) -> Self {
        Self::new(dom.create_fragment())
    }

    /// The `<template>` element's content as a definition.
    #[must_use]
    pub fn from_element(dom: &Dom, element: NodeId) -> Option<Self> {
        dom.template_content(element).map(Self::new)
    }

    /// Root of the definition's content.
    #[must_use]
    pub fn content(&self) -> NodeId {
        self.content
    }
}

/// Definition that resolves once its fetch completes.
pub type PendingTemplate<'a> = LocalBoxFuture<'a, Result<TemplateDef, EngineError>>;

/// Outcome of template resolution.
pub(crate) enum TemplateSource<'a> {
    Ready(TemplateDef),
    Pending(PendingTemplate<'a>),
    Missing,
}

impl Engine {
    /// Resolve the template an element declares, stripping both template
    /// directives. An unknown id is logged and reported as missing.
    pub(crate) fn get_template(&self, element: NodeId) -> TemplateSource<'_> {
        match TemplateDirective::consume(&self.dom, element) {
            Some(TemplateDirective::Id(id)) => self.lookup_template(&id),
            Some(TemplateDirective::Src(url)) => {
                TemplateSource::Pending(async move { self.fetch_template(&url).await }.boxed_local())
            }
            None => TemplateSource::Missing,
        }
    }

    /// Find an in-document `<template>` by id.
    pub(crate) fn lookup_template(&self, id: &str) -> TemplateSource<'static> {
        let definition = self
            .dom
            .element_by_id(id)
            .and_then(|element| TemplateDef::from_element(&self.dom, element));
        match definition {
            Some(definition) => TemplateSource::Ready(definition),
            None => {
                tracing::warn!(id = %id, "Template not found");
                TemplateSource::Missing
            }
        }
    }
}
