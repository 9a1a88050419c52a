use axum::Router;

use crate::gate::Policy;
use crate::pages::{mount, PageRoute};
use crate::state::ServerState;

pub const WEB_ROUTES: &[PageRoute] = &[
    PageRoute { name: "home", path: "/", view: "Welcome", policy: Policy::PUBLIC },
    PageRoute { name: "dashboard", path: "/dashboard", view: "Dashboard", policy: Policy::AUTH_VERIFIED },
    PageRoute { name: "schedule", path: "/schedule", view: "schedule/Schedule", policy: Policy::AUTH_VERIFIED },
];

pub fn router() -> Router<ServerState> {
    mount(WEB_ROUTES)
}
