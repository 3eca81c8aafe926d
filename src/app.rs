use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::Store;
use crate::handlers::{folders, notes, root};
use crate::middleware::require_bearer;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Build the full router: public root routes plus the folder and note
/// resources, optionally nested under the configured prefix.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut resources = resource_routes();
    if let Some(token) = config.security.api_token.as_deref() {
        resources = resources.route_layer(middleware::from_fn_with_state(Arc::<str>::from(token), require_bearer));
    }

    let router = Router::new()
        // Public
        .route("/", get(root::hello))
        .route("/health", get(root::health));

    let router = match config.server.api_prefix.as_str() {
        "" => router.merge(resources),
        prefix => router.nest(prefix, resources),
    };

    let mut router = router
        // Enforced inside the body extractor so oversized payloads get the JSON error shape
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn resource_routes() -> Router<AppState> {
    Router::new()
        .route("/folders", get(folders::list).post(folders::create))
        .route(
            "/folders/:id",
            get(folders::get).patch(folders::patch).delete(folders::delete),
        )
        .route("/notes", get(notes::list).post(notes::create))
        .route(
            "/notes/:id",
            get(notes::get).patch(notes::patch).delete(notes::delete),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
