use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, provider::QuoteProvider};

/// Create the proxy router: three GET endpoints, CORS open to all origins.
pub fn create_router(provider: Arc<dyn QuoteProvider>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/pe", get(handlers::get_pe_ratios))
        .route("/search", get(handlers::search_symbols))
        .with_state(provider)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
