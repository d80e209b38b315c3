mod handlers;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::store::JarStore;

pub fn create_router(store: JarStore, cors: CorsLayer) -> Router {
    Router::new()
        // Jars
        .route("/jars", get(handlers::list_jars).post(handlers::create_jar))
        .route("/jars/{id}", get(handlers::get_jar).delete(handlers::delete_jar))
        .route("/jars/{id}/timeline", get(handlers::get_jar_timeline))
        .route("/jars/{id}/update", post(handlers::annotate_jar))
        .route("/jars/{id}/refresh", post(handlers::refresh_jar))
        // Health
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(store)
}

/// CORS policy: any origin when `origins` is `None`, otherwise only the
/// listed origins with the methods and headers the chart UI uses.
pub fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = origins else {
        return CorsLayer::permissive();
    };

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
