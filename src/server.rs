//! Delivery endpoint: serves resolved locale payloads over HTTP.
//!
//! The endpoint is stateless and read-only; the registry is shared,
//! immutable data, so every request resolves independently. Errors never
//! cross this boundary: unknown modules become a 400 with a small error
//! body, anything unexpected becomes an opaque 500.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::i18n::{build_locale, Language, LocaleError, ModuleRegistry};

/// Shared server state: the immutable registry plus cache policy.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<ModuleRegistry>,
    cache_max_age: u64,
}

impl AppState {
    pub fn new(registry: ModuleRegistry, cache_max_age: u64) -> AppState {
        AppState {
            registry: Arc::new(registry),
            cache_max_age,
        }
    }
}

/// Query parameters accepted by the locales endpoint.
#[derive(Debug, Deserialize)]
pub struct LocaleQuery {
    lang: Option<String>,
    module: Option<String>,
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/locales", get(get_locales))
        .route("/api/languages", get(get_languages))
        .route("/health", get(health))
        .layer(CatchPanicLayer::custom(|_: Box<dyn std::any::Any + Send>| {
            error!("panic reached the delivery boundary");
            internal_error().into_response()
        }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /api/locales?lang=&module=`
///
/// Full-locale responses are cacheable (registry content is static per
/// process); single-module responses carry no cache directive.
async fn get_locales(
    State(state): State<AppState>,
    Query(query): Query<LocaleQuery>,
) -> Response {
    let language = Language::resolve(query.lang.as_deref());

    match build_locale(&state.registry, language, query.module.as_deref()) {
        Ok(payload) if query.module.is_none() => (
            StatusCode::OK,
            [(
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.cache_max_age),
            )],
            Json(payload),
        )
            .into_response(),
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(LocaleError::UnknownModule(name)) => {
            warn!(module = %name, "locale request for unknown module");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "unknown module"})),
            )
                .into_response()
        }
        Err(err) => {
            // Details stay in the logs; the caller gets an opaque error.
            error!(error = %err, "locale resolution failed");
            internal_error().into_response()
        }
    }
}

/// `GET /api/languages`: supported-language metadata for switcher UIs.
async fn get_languages() -> Json<&'static [crate::i18n::LanguageConfig]> {
    Json(Language::all())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

fn internal_error() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "server error"})),
    )
}

/// Bind and run the delivery endpoint until shutdown.
pub async fn serve(config: &Config, registry: ModuleRegistry) -> anyhow::Result<()> {
    let state = AppState::new(registry, config.cache_max_age);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Delivery endpoint listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("Delivery endpoint terminated")?;
    Ok(())
}
