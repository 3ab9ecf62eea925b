//! Tree scanning for directives outside template-applied regions.

use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, try_join_all};
use weft_dom::NodeId;

use crate::context::Context;
use crate::directive::has_expander_directive;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::template::TemplateSource;

impl Engine {
    /// Walk the tree below `element`, expanding the directives found.
    ///
    /// Unlike [`Engine::expand`], the context is not forwarded: each child
    /// starts undefined unless it declares its own data. Elements carrying
    /// `template-if` or `template-foreach` are handed to the expander with
    /// the scanner's context.
    pub(crate) fn scan(
        &self,
        element: NodeId,
        context: Context,
    ) -> LocalBoxFuture<'_, Result<NodeId, EngineError>> {
        async move {
            if has_expander_directive(&self.dom, element) {
                self.expand(element, context).await?;
                return Ok(element);
            }

            if context.is_defined() {
                self.substitute_attributes(element, &context);
            }
            let context = self.get_data(element, context).await?;

            match self.get_template(element) {
                TemplateSource::Missing => {}
                source => return self.apply_template(source, element, context).await,
            }

            let children = self.dom.element_children(element);
            try_join_all(
                children
                    .into_iter()
                    .map(|child| self.scan(child, Context::undefined())),
            )
            .await?;
            Ok(element)
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weft_dom::Dom;
    use weft_fetch::{Fetcher, MockFetcher};

    use super::*;

    fn engine(markup: &str, fetcher: &Rc<MockFetcher>) -> Engine {
        Engine::new(
            Dom::parse(markup).unwrap(),
            Rc::clone(fetcher) as Rc<dyn Fetcher>,
        )
    }

    #[tokio::test]
    async fn test_text_outside_templates_is_untouched() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(r#"<body><p title="{a}">{a}</p></body>"#, &fetcher);
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(engine.dom.inner_html(body), r#"<p title="{a}">{a}</p>"#);
    }

    #[tokio::test]
    async fn test_guarded_subtree_substitutes_attributes_and_text() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body><div template-if="true"><p title="{a}">{a}</p></div><p title="{a}">{a}</p></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(
            engine.dom.inner_html(body),
            r#"<div><p title=""></p></div><p title="{a}">{a}</p>"#
        );
    }

    #[tokio::test]
    async fn test_defined_context_substitutes_own_attributes_only() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body data-n="{n}"><p title="{n}">{n}</p></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine
            .scan(body, Context::new(json!({"n": 1})))
            .await
            .unwrap();
        assert_eq!(
            engine.dom.outer_html(body),
            r#"<body data-n="1"><p title="{n}">{n}</p></body>"#
        );
    }

    #[tokio::test]
    async fn test_context_is_not_forwarded() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<template id="t">{name}</template><body><div template="t"></div></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine
            .scan(body, Context::new(json!({"name": "lost"})))
            .await
            .unwrap();
        assert_eq!(engine.dom.inner_html(body), "<div></div>");
    }

    #[tokio::test]
    async fn test_own_data_drives_template() {
        let fetcher = Rc::new(MockFetcher::new().with_json("/user.json", &json!({"name": "Kim"})));
        let engine = engine(
            r#"<template id="t"><b>{name}</b></template><body><section><div template="t" template-data-src="/user.json">loading</div></section></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(
            engine.dom.inner_html(body),
            "<section><div><b>Kim</b></div></section>"
        );
    }

    #[tokio::test]
    async fn test_template_stops_descent() {
        let fetcher = Rc::new(MockFetcher::new().with_body("/t.html", r#"<p template-data="1">{}</p>"#));
        let engine = engine(
            r#"<body><div template-src="/t.html"><span template-data-src="/never.json"></span></div></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(engine.dom.inner_html(body), "<div><p>1</p></div>");
        assert_eq!(fetcher.requests(), vec!["/t.html"]);
    }

    #[tokio::test]
    async fn test_guard_outside_template() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body><div template-if="false">x</div><p>y</p></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(engine.dom.inner_html(body), "<p>y</p>");
    }

    #[tokio::test]
    async fn test_foreach_outside_template_uses_own_data() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body><ul><li template-data="[1, 2]" template-foreach="this">{}</li></ul></body>"#,
            &fetcher,
        );
        let body = engine.dom.body();
        engine.scan(body, Context::undefined()).await.unwrap();
        assert_eq!(
            engine.dom.inner_html(body),
            "<ul><li>1</li><li>2</li></ul>"
        );
    }
}
