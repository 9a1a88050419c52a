//! Client-rendered page responses.
//!
//! A page is a component name plus props. Requests sent by the client-side
//! router carry `X-Inertia: true` and get the page object as JSON; first
//! visits get an HTML shell with the page object embedded in `data-page`.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use configs::AppInfo;

use crate::gate::Viewer;
use crate::state::ServerState;

pub const X_INERTIA: &str = "x-inertia";
pub const X_INERTIA_VERSION: &str = "x-inertia-version";
pub const X_INERTIA_LOCATION: &str = "x-inertia-location";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page {
    pub component: String,
    pub props: Value,
    pub url: String,
    pub version: Option<String>,
}

/// What the page protocol needs to know about the incoming request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub inertia: bool,
    pub url: String,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PageRequest {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PageRequest { inertia: is_inertia(&parts.headers), url: request_url(&parts.uri) })
    }
}

impl PageRequest {
    pub fn render(&self, app: &AppInfo, viewer: &Viewer, component: &str, props: Value) -> Response {
        let page = Page {
            component: component.to_string(),
            props: with_shared_props(app, viewer, props),
            url: self.url.clone(),
            version: app.asset_version.clone(),
        };
        if self.inertia {
            let mut res = Json(page).into_response();
            let headers = res.headers_mut();
            headers.insert(X_INERTIA, HeaderValue::from_static("true"));
            headers.insert(header::VARY, HeaderValue::from_static("X-Inertia"));
            res
        } else {
            Html(shell(&app.name, &page)).into_response()
        }
    }
}

/// Shared props first so a page can override them.
fn with_shared_props(app: &AppInfo, viewer: &Viewer, props: Value) -> Value {
    let mut merged = Map::new();
    merged.insert("name".into(), Value::String(app.name.clone()));
    merged.insert("auth".into(), json!({ "user": viewer.user() }));
    match props {
        Value::Object(own) => merged.extend(own),
        Value::Null => {}
        other => {
            merged.insert("data".into(), other);
        }
    }
    Value::Object(merged)
}

fn shell(title: &str, page: &Page) -> String {
    let data = serde_json::to_string(page).unwrap_or_else(|_| "{}".into());
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n</head>\n<body>\n<div id=\"app\" data-page=\"{}\"></div>\n</body>\n</html>\n",
        escape_html(title),
        escape_html(&data)
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn is_inertia(headers: &axum::http::HeaderMap) -> bool {
    headers.get(X_INERTIA).and_then(|v| v.to_str().ok()) == Some("true")
}

fn request_url(uri: &axum::http::Uri) -> String {
    uri.path_and_query().map(|pq| pq.as_str().to_string()).unwrap_or_else(|| uri.path().to_string())
}

/// A plain `302 Found`.
pub fn redirect(to: &str) -> Response {
    match HeaderValue::from_str(to) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Stale client assets: answer `409` so the client does a full reload.
/// Skipped when no asset version is configured.
pub async fn version_check(State(state): State<ServerState>, req: Request, next: Next) -> Response {
    let Some(current) = state.app.asset_version.as_deref() else {
        return next.run(req).await;
    };
    if req.method() == Method::GET && is_inertia(req.headers()) {
        let sent = req.headers().get(X_INERTIA_VERSION).and_then(|v| v.to_str().ok());
        if sent.is_some_and(|v| v != current) {
            debug!(client = ?sent, %current, "asset version mismatch");
            let url = request_url(req.uri());
            let mut res = StatusCode::CONFLICT.into_response();
            if let Ok(location) = HeaderValue::from_str(&url) {
                res.headers_mut().insert(X_INERTIA_LOCATION, location);
            }
            return res;
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_props_are_merged_and_overridable() {
        let app = AppInfo::default();
        let props = with_shared_props(&app, &Viewer::Guest, json!({"status": "ok", "name": "Custom"}));
        assert_eq!(props["name"], "Custom");
        assert_eq!(props["status"], "ok");
        assert!(props["auth"]["user"].is_null());
    }

    #[test]
    fn shell_escapes_page_json() {
        let page = Page { component: "Welcome".into(), props: json!({"q": "<a href='x'>"}), url: "/".into(), version: None };
        let html = shell("Store & Co", &page);
        assert!(html.contains("<title>Store &amp; Co</title>"));
        assert!(html.contains("data-page=\"{&quot;component&quot;:&quot;Welcome&quot;"));
        assert!(!html.contains("<a href"));
    }
}
