//! Element expansion: the directive state machine applied inside templates.
//!
//! Directives on an element are processed in a fixed order:
//!
//! 1. `{…}` substitution in every attribute value
//! 2. `template-if`: a falsy guard removes the element and stops
//! 3. `template-data-src` then `template-data` replace the context
//! 4. `template-foreach`: the element is replaced by one expanded clone per item
//! 5. `template` / `template-src`: the template replaces the element's content
//! 6. `{…}` substitution in direct text children
//! 7. element children are expanded concurrently with the current context

use std::borrow::Cow;

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, try_join_all};
use serde_json::Value;
use weft_dom::NodeId;
use weft_expr::{evaluate, is_truthy, replace};

use crate::context::Context;
use crate::directive::ElementDirectives;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::template::TemplateSource;

/// What became of an expanded element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion {
    /// The element stays in place, expanded.
    Kept(NodeId),
    /// The element was replaced by these nodes (iteration clones).
    Replaced(Vec<NodeId>),
    /// The element was removed by a falsy guard.
    Removed,
}

impl Engine {
    /// Expand one element against `context`.
    ///
    /// The returned future completes only after the element's whole subtree
    /// has settled.
    ///
    /// # Errors
    ///
    /// Propagates transport failures and malformed JSON data from anywhere in
    /// the subtree.
    pub fn expand(
        &self,
        element: NodeId,
        context: Context,
    ) -> LocalBoxFuture<'_, Result<Expansion, EngineError>> {
        async move {
            self.substitute_attributes(element, &context);
            let directives = ElementDirectives::consume(&self.dom, element);

            if let Some(guard) = directives.guard
                && !is_truthy(&evaluate(&guard, context.value()))
            {
                tracing::debug!(guard = %guard, "Removing element with falsy guard");
                self.dom.detach(element);
                return Ok(Expansion::Removed);
            }

            let context = self.resolve_data(directives.data, context).await?;

            if let Some(source) = directives.foreach {
                match evaluate(&source, context.value()) {
                    Value::Array(items) => return self.repeat(element, items).await,
                    other => {
                        tracing::warn!(
                            expression = %source,
                            value = %other,
                            "Iteration source is not an array"
                        );
                    }
                }
            }

            match self.get_template(element) {
                TemplateSource::Missing => {}
                source => {
                    self.apply_template(source, element, context).await?;
                    return Ok(Expansion::Kept(element));
                }
            }

            self.substitute_text_children(element, &context);
            self.expand_children(element, &context).await?;
            Ok(Expansion::Kept(element))
        }
        .boxed_local()
    }

    /// Replace `element` with one clone per item, each expanded against its item.
    async fn repeat(&self, element: NodeId, items: Vec<Value>) -> Result<Expansion, EngineError> {
        let fragment = self.dom.create_fragment();
        let clones: Vec<NodeId> = items
            .iter()
            .map(|_| {
                let clone = self.dom.clone_node(element);
                self.dom.append_child(fragment, clone);
                clone
            })
            .collect();

        try_join_all(
            clones
                .into_iter()
                .zip(items)
                .map(|(clone, item)| self.expand(clone, Context::new(item))),
        )
        .await?;

        let nodes = self.dom.children(fragment);
        self.dom.insert_after(element, fragment);
        self.dom.detach(element);
        Ok(Expansion::Replaced(nodes))
    }

    /// Expand every element child of `parent` concurrently.
    pub(crate) async fn expand_children(
        &self,
        parent: NodeId,
        context: &Context,
    ) -> Result<(), EngineError> {
        let children = self.dom.element_children(parent);
        try_join_all(
            children
                .into_iter()
                .map(|child| self.expand(child, context.clone())),
        )
        .await?;
        Ok(())
    }

    /// Substitute `{…}` patterns in every attribute value.
    ///
    /// An undefined context evaluates as `null`, like text.
    pub(crate) fn substitute_attributes(&self, element: NodeId, context: &Context) {
        for attr in self.dom.attributes(element) {
            if let Cow::Owned(value) = replace(&attr.value, context.value()) {
                self.dom.set_attribute(element, &attr.name, value);
            }
        }
    }

    /// Substitute `{…}` patterns in the direct text children of `parent`.
    pub(crate) fn substitute_text_children(&self, parent: NodeId, context: &Context) {
        for node in self.dom.text_children(parent) {
            let Some(text) = self.dom.text(node) else {
                continue;
            };
            if let Cow::Owned(text) = replace(&text, context.value()) {
                self.dom.set_text(node, text);
            }
        }
    }
}
