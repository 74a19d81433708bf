use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{get, put};
use axum::Router;
use relay_protocol::endpoints;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all relay endpoints.
///
/// Request bodies above `max_body_size` bytes are rejected with
/// `413 Payload Too Large` before any handler runs.
pub fn build_router(state: AppState, max_body_size: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route(endpoints::STORE_PUSH, put(handler::push_store))
        .route(endpoints::STORE_PULL, get(handler::pull_store))
        .route(endpoints::STORE_RESOLVE, get(handler::resolve_store))
        .route(endpoints::GRAPH_VERSION_PUSH, put(handler::push_graph_version))
        .route(endpoints::GRAPH_VERSION_PULL, get(handler::pull_graph_version))
        .route(endpoints::GRAPH_INDEX_PULL, get(handler::pull_graph_index))
        .route(endpoints::BLOCKS_PUSH, put(handler::push_blocks))
        .route(endpoints::BLOCKS_PULL, put(handler::pull_blocks))
        .route(endpoints::PROTOCOL_VERSION, get(handler::protocol_version))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
