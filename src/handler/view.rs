//! Entry view rendering
//!
//! Renders the dashboard's HTML shell from a template in the views directory.

use super::template;
use crate::http::{self, HttpResponse};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;

/// Input handed to the entry handler
#[derive(Debug, Clone, Copy)]
pub struct EntryContext<'a> {
    pub base_path: &'a str,
    pub ui_config: &'a Value,
}

/// Template file name plus the parameters to render it with
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTemplate {
    pub name: String,
    pub params: Value,
}

pub type EntryHandler = Arc<dyn Fn(&EntryContext<'_>) -> ViewTemplate + Send + Sync>;

/// Paths that render the entry view, and how to build its template
#[derive(Clone)]
pub struct EntryRoute {
    pub paths: Vec<String>,
    pub handler: EntryHandler,
}

impl EntryRoute {
    pub fn new<I, S, F>(paths: I, handler: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&EntryContext<'_>) -> ViewTemplate + Send + Sync + 'static,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            handler: Arc::new(handler),
        }
    }

    /// Exact match on a configured path, or that path with a trailing slash
    pub fn matches(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|p| path == p || path.strip_suffix('/') == Some(p.as_str()))
    }
}

impl std::fmt::Debug for EntryRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRoute")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

/// Entry route rendering `template` with the standard dashboard parameters
pub fn entry_route<I, S>(paths: I, template: &str) -> EntryRoute
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let name = template.to_string();
    EntryRoute::new(paths, move |ctx: &EntryContext<'_>| {
        let title = ctx
            .ui_config
            .get("boardTitle")
            .and_then(Value::as_str)
            .unwrap_or("Queue Dashboard");
        let fav_icon = ctx.ui_config.get("favIcon");
        ViewTemplate {
            name: name.clone(),
            params: json!({
                "basePath": ctx.base_path,
                "title": title,
                "uiConfig": ctx.ui_config,
                "favIconDefault": fav_icon
                    .and_then(|f| f.get("default"))
                    .and_then(Value::as_str)
                    .unwrap_or("static/images/logo.svg"),
                "favIconAlternative": fav_icon
                    .and_then(|f| f.get("alternative"))
                    .and_then(Value::as_str)
                    .unwrap_or("static/favicon-32x32.png"),
            }),
        }
    })
}

/// Entry route serving `index.ejs` at `/`
pub fn default_entry_route() -> EntryRoute {
    entry_route(["/"], "index.ejs")
}

/// Renders the entry view from `views_dir`
#[derive(Debug, Clone)]
pub struct ViewRenderer {
    views_dir: PathBuf,
    entry: EntryRoute,
}

impl ViewRenderer {
    pub fn new(views_dir: impl Into<PathBuf>, entry: EntryRoute) -> Self {
        Self {
            views_dir: views_dir.into(),
            entry,
        }
    }

    pub const fn entry(&self) -> &EntryRoute {
        &self.entry
    }

    /// Render the entry template; any failure becomes a 500
    pub async fn render(&self, base_path: &str, ui_config: &Value) -> HttpResponse {
        let view = (self.entry.handler)(&EntryContext {
            base_path,
            ui_config,
        });
        let template_path = self.views_dir.join(&view.name);

        let source = match fs::read_to_string(&template_path).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(
                    template = %template_path.display(),
                    error = %e,
                    "failed to read view template"
                );
                return http::build_500_response();
            }
        };

        let html = match template::render(&source, &view.params) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(template = %view.name, error = %e, "failed to render view");
                return http::build_500_response();
            }
        };

        if base_path == "/" {
            http::build_html_response(html)
        } else {
            http::build_html_response(rewrite_asset_urls(&html, base_path))
        }
    }
}

/// Prefix `/static/` and `static/` asset references in `src`/`href`
/// attributes with `base_path`
pub fn rewrite_asset_urls(html: &str, base_path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let mut out = html.to_string();
    for attr in ["src", "href"] {
        let mounted = format!(r#"{attr}="{base}/static/"#);
        out = out
            .replace(&format!(r#"{attr}="/static/"#), &mounted)
            .replace(&format!(r#"{attr}="static/"#), &mounted);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;

    async fn body_string(resp: HttpResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const INDEX: &str = r#"<html><head><title><%= title %></title>
<link href="/static/css/app.css"><link rel="icon" href="<%= favIconDefault %>">
</head><body data-base="<%= basePath %>"><script src="static/app.js"></script></body></html>"#;

    fn views() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.ejs"), INDEX).unwrap();
        std::fs::write(dir.path().join("broken.ejs"), "<%= nope %>").unwrap();
        dir
    }

    #[test]
    fn test_entry_route_matches() {
        let entry = EntryRoute::new(["/", "/board"], |_: &EntryContext<'_>| ViewTemplate {
            name: "index.ejs".into(),
            params: json!({}),
        });
        assert!(entry.matches("/"));
        assert!(entry.matches("/board"));
        assert!(entry.matches("/board/"));
        assert!(!entry.matches("/board/x"));
        assert!(!entry.matches("/api"));
    }

    #[test]
    fn test_rewrite_asset_urls() {
        let html = concat!(
            r#"<script src="/static/a.js"></script>"#,
            r#"<link href="static/b.css"><a href="/other">"#,
        );
        assert_eq!(
            rewrite_asset_urls(html, "/admin"),
            concat!(
                r#"<script src="/admin/static/a.js"></script>"#,
                r#"<link href="/admin/static/b.css"><a href="/other">"#,
            )
        );
    }

    #[test]
    fn test_default_entry_params() {
        let ui = json!({"boardTitle": "Mail queues"});
        let view = (default_entry_route().handler)(&EntryContext {
            base_path: "/admin",
            ui_config: &ui,
        });
        assert_eq!(view.name, "index.ejs");
        assert_eq!(view.params["title"], "Mail queues");
        assert_eq!(view.params["basePath"], "/admin");
        assert_eq!(view.params["uiConfig"], ui);
    }

    #[tokio::test]
    async fn test_render_under_base_path() {
        let dir = views();
        let renderer = ViewRenderer::new(dir.path(), default_entry_route());
        let resp = renderer.render("/admin", &json!({})).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[CONTENT_TYPE], "text/html");
        let html = body_string(resp).await;
        assert!(html.contains("<title>Queue Dashboard</title>"));
        assert!(html.contains(r#"href="/admin/static/css/app.css""#));
        assert!(html.contains(r#"src="/admin/static/app.js""#));
        assert!(html.contains(r#"href="/admin/static/images/logo.svg""#));
        assert!(html.contains(r#"data-base="/admin""#));
    }

    #[tokio::test]
    async fn test_render_at_root_leaves_urls() {
        let dir = views();
        let renderer = ViewRenderer::new(dir.path(), default_entry_route());
        let html = body_string(renderer.render("/", &json!({})).await).await;
        assert!(html.contains(r#"href="/static/css/app.css""#));
        assert!(html.contains(r#"src="static/app.js""#));
    }

    #[tokio::test]
    async fn test_missing_template_is_500() {
        let dir = views();
        let entry = EntryRoute::new(["/"], |_: &EntryContext<'_>| ViewTemplate {
            name: "missing.ejs".into(),
            params: json!({}),
        });
        let resp = ViewRenderer::new(dir.path(), entry)
            .render("/", &json!({}))
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(resp).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_render_error_is_500() {
        let dir = views();
        let entry = EntryRoute::new(["/"], |_: &EntryContext<'_>| ViewTemplate {
            name: "broken.ejs".into(),
            params: json!({}),
        });
        let resp = ViewRenderer::new(dir.path(), entry)
            .render("/", &json!({}))
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
