//! Declarative page tables and the dispatcher that mounts them.

use axum::{extract::State, middleware, routing::get, Router};
use serde_json::json;

use crate::gate::{enforce, Policy, Viewer};
use crate::inertia::PageRequest;
use crate::routes::{auth::AUTH_PAGES, settings::SETTINGS_PAGES, web::WEB_ROUTES};
use crate::state::ServerState;

/// One `GET` page: path, reverse-routing name, client component and access policy.
#[derive(Clone, Copy, Debug)]
pub struct PageRoute {
    pub name: &'static str,
    pub path: &'static str,
    pub view: &'static str,
    pub policy: Policy,
}

/// Every page table mounted by the router.
pub fn page_tables() -> [&'static [PageRoute]; 3] {
    [WEB_ROUTES, AUTH_PAGES, SETTINGS_PAGES]
}

/// Reverse routing across all mounted page tables.
pub fn path_for(name: &str) -> Option<&'static str> {
    page_tables()
        .into_iter()
        .flatten()
        .find(|route| route.name == name)
        .map(|route| route.path)
}

/// One `GET` handler per entry; non-public entries get their policy as a route layer.
pub fn mount(table: &'static [PageRoute]) -> Router<ServerState> {
    table.iter().fold(Router::new(), |router, route| {
        let page = Router::new().route(
            route.path,
            get(move |req: PageRequest, viewer: Viewer, State(state): State<ServerState>| async move {
                req.render(&state.app, &viewer, route.view, json!({}))
            }),
        );
        let page = if route.policy.is_public() {
            page
        } else {
            page.route_layer(middleware::from_fn_with_state(route.policy, enforce))
        };
        router.merge(page)
    })
}
