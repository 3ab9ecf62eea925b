//! Template application.

use weft_dom::NodeId;

use crate::context::Context;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::template::{TemplateDef, TemplateSource};

impl Engine {
    /// Expand a clone of the template against `context` and make it the
    /// entire content of `container`.
    ///
    /// A missing template is logged and applied as an empty one, which clears
    /// the container.
    pub(crate) async fn apply_template(
        &self,
        source: TemplateSource<'_>,
        container: NodeId,
        context: Context,
    ) -> Result<NodeId, EngineError> {
        let template = match source {
            TemplateSource::Ready(template) => template,
            TemplateSource::Pending(pending) => pending.await?,
            TemplateSource::Missing => {
                tracing::warn!("No valid template to apply, using an empty template");
                TemplateDef::empty(&self.dom)
            }
        };

        let content = self.dom.clone_node(template.content());
        self.substitute_text_children(content, &context);
        self.expand_children(content, &context).await?;
        self.dom.replace_children(container, content);

        tracing::debug!(container = ?container, "Applied template");
        Ok(container)
    }
}
