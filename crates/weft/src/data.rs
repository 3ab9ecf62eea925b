//! Data resolution for `template-data-src` and `template-data`.

use weft_dom::NodeId;
use weft_expr::{evaluate, replace};

use crate::context::Context;
use crate::directive::DataDirectives;
use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Strip the element's data directives and resolve its context.
    pub(crate) async fn get_data(
        &self,
        element: NodeId,
        context: Context,
    ) -> Result<Context, EngineError> {
        let directives = DataDirectives::consume(&self.dom, element);
        self.resolve_data(directives, context).await
    }

    /// Apply data directives in order: the fetched document replaces the
    /// context, then the data expression replaces it again.
    pub(crate) async fn resolve_data(
        &self,
        directives: DataDirectives,
        mut context: Context,
    ) -> Result<Context, EngineError> {
        if let Some(src) = directives.src {
            let url = replace(&src, context.value());
            context = Context::new(self.fetch_data(&url).await?);
        }
        if let Some(expression) = directives.expression {
            context = Context::new(evaluate(&expression, context.value()));
        }
        Ok(context)
    }
}
