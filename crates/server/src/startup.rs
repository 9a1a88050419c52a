use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging, LogFormat};
use configs::{AppConfig, LoggingConfig};
use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::store_hours::repo::seaorm::SeaOrmStoreHoursRepository;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

/// Initialize logging from the `[logging]` config section
pub fn init_logging_from(cfg: &LoggingConfig) {
    init_logging(LogFormat::parse(&cfg.format), cfg.filter.as_deref());
}

/// `server.cors_origins`, or just the app's own origin when none are listed.
pub fn allowed_origins(cfg: &AppConfig) -> Vec<String> {
    if cfg.server.cors_origins.is_empty() {
        vec![cfg.app.url.clone()]
    } else {
        cfg.server.cors_origins.clone()
    }
}

/// Credentialed CORS restricted to an explicit origin list. Unlisted origins
/// get no `Access-Control-Allow-*` headers.
pub fn build_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let trimmed = origin.trim().trim_end_matches('/');
            match HeaderValue::from_str(trimmed) {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(%origin, error = %e, "ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-inertia"),
            HeaderName::from_static("x-inertia-version"),
        ])
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, draining connections");
}

/// Connect storage and assemble the router for a validated config.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    common::env::ensure_database_dir(&cfg.database.url).await?;
    let db = models::db::connect_with_config(&cfg.database)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    if cfg.database.auto_migrate {
        models::db::migrate(&db).await?;
        info!("migrations applied");
    }
    if cfg.auth.uses_dev_secret() {
        warn!("JWT secret is the development default, set JWT_SECRET in production");
    }

    let state = ServerState::new(
        Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        Arc::new(SeaOrmStoreHoursRepository { db }),
        &cfg.auth,
        cfg.app.clone(),
    );
    Ok(routes::build_router(state, build_cors(&allowed_origins(cfg))))
}

/// Serve until Ctrl+C.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;
    let app = build_app(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, app = %cfg.app.name, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
