use std::sync::Arc;

use chrono::Duration;
use configs::{AppInfo, AuthConfig as AuthSettings};
use service::auth::{repository::AuthRepository, service::AuthConfig, AuthService};
use service::store_hours::{repository::StoreHoursRepository, StoreHoursService};

/// Shared router state. Repositories are trait objects so tests can swap in
/// the in-memory implementations.
#[derive(Clone)]
pub struct ServerState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub store_hours: Arc<StoreHoursService<dyn StoreHoursRepository>>,
    pub app: Arc<AppInfo>,
    pub secure_cookies: bool,
}

impl ServerState {
    pub fn new(
        auth_repo: Arc<dyn AuthRepository>,
        store_hours_repo: Arc<dyn StoreHoursRepository>,
        auth: &AuthSettings,
        app: AppInfo,
    ) -> Self {
        let cfg = AuthConfig {
            jwt_secret: auth.jwt_secret.clone(),
            password_algorithm: "argon2".into(),
            session_ttl: Duration::hours(auth.session_ttl_hours),
            verification_ttl: Duration::hours(auth.verification_ttl_hours),
        };
        Self {
            auth: Arc::new(AuthService::new(auth_repo, cfg)),
            store_hours: Arc::new(StoreHoursService::new(store_hours_repo)),
            app: Arc::new(app),
            secure_cookies: auth.secure_cookies,
        }
    }
}
