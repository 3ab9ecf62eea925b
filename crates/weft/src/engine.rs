//! Expansion engine and its entry point.

use std::rc::Rc;

use serde_json::Value;
use weft_config::Config;
use weft_dom::{Dom, NodeId};
use weft_fetch::{FetchError, Fetcher, HttpFetcher};

use crate::context::Context;
use crate::error::EngineError;
use crate::template::{PendingTemplate, TemplateDef, TemplateSource};

/// Template to apply in [`Engine::run`].
pub enum TemplateRef<'a> {
    /// Id of an in-document `<template>`.
    Id(String),
    /// An already resolved definition.
    Definition(TemplateDef),
    /// A definition still being fetched.
    Pending(PendingTemplate<'a>),
}

impl From<&str> for TemplateRef<'_> {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<TemplateDef> for TemplateRef<'_> {
    fn from(definition: TemplateDef) -> Self {
        Self::Definition(definition)
    }
}

/// Element that receives the expansion in [`Engine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerRef {
    /// Id of an element in the document.
    Id(String),
    /// The element itself.
    Node(NodeId),
}

impl From<&str> for ContainerRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_owned())
    }
}

impl From<NodeId> for ContainerRef {
    fn from(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// Template expansion engine over one document.
///
/// All expansion futures are `!Send` and run cooperatively on the current
/// thread; sibling subtrees are expanded concurrently.
#[derive(Clone)]
pub struct Engine {
    pub(crate) dom: Dom,
    pub(crate) fetcher: Rc<dyn Fetcher>,
}

impl Engine {
    /// Create an engine that fetches remote resources through `fetcher`.
    #[must_use]
    pub fn new(dom: Dom, fetcher: Rc<dyn Fetcher>) -> Self {
        Self { dom, fetcher }
    }

    /// Create an engine with an HTTP fetcher built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if the configured base URL is invalid.
    pub fn from_config(dom: Dom, config: &Config) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::from_config(&config.fetch)?;
        Ok(Self::new(dom, Rc::new(fetcher)))
    }

    /// The document this engine expands.
    #[must_use]
    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    /// Expand the document.
    ///
    /// `container` defaults to the document body. Without a template the
    /// tree scanner walks the container looking for directives; with one, the
    /// template is applied to the container with `data` as context. A
    /// template id that matches no `<template>` is logged and applied as an
    /// empty template.
    ///
    /// Resolves to the container once every nested expansion has settled.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ContainerNotFound`] for an unknown container id,
    /// and propagates transport failures and malformed JSON data.
    pub async fn run(
        &self,
        template: Option<TemplateRef<'_>>,
        container: Option<ContainerRef>,
        data: Option<Value>,
    ) -> Result<NodeId, EngineError> {
        let container = self.resolve_container(container)?;
        let context = Context::from(data);

        let source = match template {
            None => return self.scan(container, context).await,
            Some(TemplateRef::Id(id)) => self.lookup_template(&id),
            Some(TemplateRef::Definition(definition)) => TemplateSource::Ready(definition),
            Some(TemplateRef::Pending(pending)) => TemplateSource::Pending(pending),
        };
        self.apply_template(source, container, context).await
    }

    fn resolve_container(&self, container: Option<ContainerRef>) -> Result<NodeId, EngineError> {
        match container {
            None => Ok(self.dom.body()),
            Some(ContainerRef::Node(node)) => Ok(node),
            Some(ContainerRef::Id(id)) => self
                .dom
                .element_by_id(&id)
                .ok_or(EngineError::ContainerNotFound(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::FutureExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use weft_fetch::MockFetcher;

    use super::*;
    use crate::directive;

    fn engine(markup: &str, fetcher: &Rc<MockFetcher>) -> Engine {
        Engine::new(
            Dom::parse(markup).unwrap(),
            Rc::clone(fetcher) as Rc<dyn Fetcher>,
        )
    }

    #[tokio::test]
    async fn test_run_without_template_removes_falsy_guard() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body><div template-if="false">x</div></body>"#,
            &fetcher,
        );
        let body = engine.run(None, None, None).await.unwrap();
        assert_eq!(body, engine.dom().body());
        assert_eq!(engine.dom().inner_html(body), "");
    }

    #[tokio::test]
    async fn test_run_with_template_id() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<template id="t"><span>{value}</span></template><body></body>"#,
            &fetcher,
        );
        let body = engine
            .run(Some("t".into()), None, Some(json!({"value": 5})))
            .await
            .unwrap();
        assert_eq!(engine.dom().inner_html(body), "<span>5</span>");
    }

    #[tokio::test]
    async fn test_run_foreach_over_context() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<template id="items"><li template-foreach="this">{}</li></template><body><ul id="list"></ul></body>"#,
            &fetcher,
        );
        let list = engine
            .run(
                Some("items".into()),
                Some("list".into()),
                Some(json!([1, 2, 3])),
            )
            .await
            .unwrap();
        assert_eq!(
            engine.dom().outer_html(list),
            r#"<ul id="list"><li>1</li><li>2</li><li>3</li></ul>"#
        );
    }

    #[tokio::test]
    async fn test_run_data_src_not_found() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<template id="t"><p template-data-src="/missing.json">[{field}]</p></template><body></body>"#,
            &fetcher,
        );
        let body = engine.run(Some("t".into()), None, None).await.unwrap();
        assert_eq!(engine.dom().inner_html(body), "<p>[]</p>");
    }

    #[tokio::test]
    async fn test_run_missing_template_id_clears_container() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(r#"<body><div id="out">stale</div></body>"#, &fetcher);
        let out = engine
            .run(Some("absent".into()), Some("out".into()), None)
            .await
            .unwrap();
        assert_eq!(engine.dom().outer_html(out), r#"<div id="out"></div>"#);
    }

    #[tokio::test]
    async fn test_run_unknown_container() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine("<body></body>", &fetcher);
        let err = engine
            .run(None, Some("nowhere".into()), None)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ContainerNotFound(ref id) if id == "nowhere"));
    }

    #[tokio::test]
    async fn test_run_container_node() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<template id="t">{}</template><body><p></p><p></p></body>"#,
            &fetcher,
        );
        let second = engine.dom().element_children(engine.dom().body())[1];
        engine
            .run(Some("t".into()), Some(second.into()), Some(json!("two")))
            .await
            .unwrap();
        assert_eq!(
            engine.dom().inner_html(engine.dom().body()),
            "<p></p><p>two</p>"
        );
    }

    #[tokio::test]
    async fn test_run_with_definition_and_pending() {
        let fetcher = Rc::new(MockFetcher::new().with_body("/remote.html", "<i>{n}</i>"));
        let engine = engine(
            r#"<template id="t"><b>{n}</b></template><body><div id="a"></div><div id="b"></div></body>"#,
            &fetcher,
        );
        let element = engine.dom().element_by_id("t").unwrap();
        let definition = TemplateDef::from_element(engine.dom(), element).unwrap();

        let a = engine
            .run(Some(definition.into()), Some("a".into()), Some(json!({"n": 1})))
            .await
            .unwrap();
        let pending = engine.fetch_template("/remote.html").boxed_local();
        let b = engine
            .run(
                Some(TemplateRef::Pending(pending)),
                Some("b".into()),
                Some(json!({"n": 2})),
            )
            .await
            .unwrap();

        assert_eq!(engine.dom().inner_html(a), "<b>1</b>");
        assert_eq!(engine.dom().inner_html(b), "<i>2</i>");
    }

    #[tokio::test]
    async fn test_each_run_refetches_remote_templates() {
        let fetcher = Rc::new(MockFetcher::new().with_body("/card.html", "<p>v1</p>"));
        let engine = engine(r#"<body><div id="out"></div></body>"#, &fetcher);

        engine
            .run(
                Some(TemplateRef::Pending(engine.fetch_template("/card.html").boxed_local())),
                Some("out".into()),
                None,
            )
            .await
            .unwrap();
        fetcher.set_response("/card.html", 200, "<p>v2</p>");
        let out = engine
            .run(
                Some(TemplateRef::Pending(engine.fetch_template("/card.html").boxed_local())),
                Some("out".into()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(fetcher.request_count("/card.html"), 2);
        assert_eq!(engine.dom().inner_html(out), "<p>v2</p>");
    }

    #[tokio::test]
    async fn test_fetched_template_with_operators_in_text() {
        let fetcher = Rc::new(MockFetcher::new().with_body(
            "/status.html",
            "<p>{ok && name}</p><p>{n < 3 ? 'few' : 'many'}</p><p>{n > 1}</p>",
        ));
        let engine = engine(r#"<body><div id="out"></div></body>"#, &fetcher);
        let out = engine
            .run(
                Some(TemplateRef::Pending(engine.fetch_template("/status.html").boxed_local())),
                Some("out".into()),
                Some(json!({"ok": true, "name": "Ada", "n": 2})),
            )
            .await
            .unwrap();

        assert_eq!(
            engine.dom().inner_html(out),
            "<p>Ada</p><p>few</p><p>true</p>"
        );
    }

    #[tokio::test]
    async fn test_scanned_guard_substitutes_against_undefined_context() {
        let fetcher = Rc::new(MockFetcher::new());
        let engine = engine(
            r#"<body><div template-if="true"><p title="[{a}]">[{a}]</p></div><p title="{a}">{a}</p></body>"#,
            &fetcher,
        );
        let body = engine.run(None, None, None).await.unwrap();

        assert_eq!(
            engine.dom().inner_html(body),
            r#"<div><p title="[]">[]</p></div><p title="{a}">{a}</p>"#
        );
    }

    #[tokio::test]
    async fn test_nested_template_src_refetched_per_use() {
        let fetcher = Rc::new(MockFetcher::new().with_body("/tag.html", "<b>{}</b>"));
        let engine = engine(
            r#"<template id="t"><span template-foreach="this" template-src="/tag.html"></span></template><body></body>"#,
            &fetcher,
        );
        engine
            .run(Some("t".into()), None, Some(json!(["x", "y", "z"])))
            .await
            .unwrap();
        assert_eq!(fetcher.request_count("/tag.html"), 3);
    }

    #[tokio::test]
    async fn test_directives_never_rendered() {
        let fetcher = Rc::new(
            MockFetcher::new()
                .with_json("/d.json", &json!({"items": [{"ok": true}, {"ok": false}]}))
                .with_body("/row.html", "<td>{ok}</td>"),
        );
        let engine = engine(
            r#"<template id="page"><table template-data-src="/d.json"><tr template-foreach="items" template-if="items.length"><td template-if="ok" template-data="this" template-src="/row.html"></td></tr></table><p template="missing">gone?</p></template><body></body>"#,
            &fetcher,
        );
        let body = engine.run(Some("page".into()), None, None).await.unwrap();
        let html = engine.dom().inner_html(body);
        for name in [
            directive::TEMPLATE_DATA_SRC,
            directive::TEMPLATE_DATA,
            directive::TEMPLATE_FOREACH,
            directive::TEMPLATE_IF,
            directive::TEMPLATE_SRC,
        ] {
            assert!(!html.contains(&format!("{name}=")), "{name} leaked into {html}");
        }
        assert!(!html.contains(r#" template=""#), "template leaked into {html}");
        assert_eq!(
            html,
            "<table><tr><td><td>true</td></td></tr><tr></tr></table><p>gone?</p>"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_rejects_run() {
        let fetcher = Rc::new(MockFetcher::new().with_failure("/d.json", "network down"));
        let engine = engine(
            r#"<body><section><div template-data-src="/d.json"></div></section><p>ok</p></body>"#,
            &fetcher,
        );
        let err = engine.run(None, None, None).await.unwrap_err();
        assert!(matches!(err, EngineError::Fetch(_)));
        assert!(err.to_string().contains("network down"));
    }

    #[tokio::test]
    async fn test_malformed_json_rejects_run() {
        let fetcher = Rc::new(MockFetcher::new().with_body("/d.json", "<html>"));
        let engine = engine(
            r#"<template id="t"><div template-data-src="/d.json"></div></template><body></body>"#,
            &fetcher,
        );
        let err = engine.run(Some("t".into()), None, None).await.unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }

    #[tokio::test]
    async fn test_sibling_fetches_start_in_source_order() {
        let fetcher = Rc::new(
            MockFetcher::new()
                .with_json("/a.json", &json!({"v": "a"}))
                .with_json("/b.json", &json!({"v": "b"})),
        );
        let engine = engine(
            r#"<template id="t"><p template-data-src="/a.json">{v}</p><p template-data-src="/b.json">{v}</p></template><body></body>"#,
            &fetcher,
        );
        let body = engine.run(Some("t".into()), None, None).await.unwrap();
        assert_eq!(fetcher.requests(), vec!["/a.json", "/b.json"]);
        assert_eq!(engine.dom().inner_html(body), "<p>a</p><p>b</p>");
    }
}
