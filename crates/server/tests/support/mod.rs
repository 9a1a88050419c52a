#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use configs::AppInfo;
use server::routes;
use server::startup::build_cors;
use server::state::ServerState;
use service::auth::repository::{mock::MockAuthRepository, AuthRepository};
use service::store_hours::repository::mock::InMemoryStoreHoursRepository;

pub const ALLOWED_ORIGIN: &str = "https://shop.example";

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
    pub users: Arc<MockAuthRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_app_info(AppInfo::default())
    }

    pub fn with_app_info(app: AppInfo) -> Self {
        let users = Arc::new(MockAuthRepository::default());
        let auth = configs::AuthConfig { jwt_secret: "test-secret".into(), ..Default::default() };
        let state = ServerState::new(users.clone(), Arc::new(InMemoryStoreHoursRepository::default()), &auth, app);
        let router = routes::build_router(state.clone(), build_cors(&[ALLOWED_ORIGIN.to_string()]));
        Self { router, state, users }
    }

    /// Session token for a fresh user, skipping password hashing.
    pub async fn session(&self, email: &str, verified: bool) -> String {
        let mut user = self.users.create_user(email, "Tester").await.unwrap();
        if verified {
            user = self.users.mark_email_verified(user.id).await.unwrap();
        }
        self.state.auth.issue_session_token(&user).unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }
}

pub fn page(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri).header("x-inertia", "true");
    if let Some(t) = token {
        b = b.header(header::COOKIE, format!("auth_token={t}"));
    }
    b.body(Body::empty()).unwrap()
}

pub fn json(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut b = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = token {
        b = b.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let body = body.map(|v| Body::from(serde_json::to_vec(&v).unwrap())).unwrap_or_else(Body::empty);
    b.body(body).unwrap()
}

pub async fn body_json(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(res: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(res: &Response<Body>) -> Option<&str> {
    res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok())
}

pub fn set_cookie(res: &Response<Body>) -> Option<String> {
    res.headers().get(header::SET_COOKIE).and_then(|v| v.to_str().ok()).map(str::to_string)
}
