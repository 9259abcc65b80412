//! HTTP routes for the status server

mod status;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::channel::MessagingChannel;
use crate::state::AppState;
use crate::store::Store;

/// Create the router with all routes
pub fn create_router<S, C>(state: Arc<AppState<S, C>>) -> Router
where
    S: Store + 'static,
    C: MessagingChannel + 'static,
{
    Router::new()
        .route("/", get(status::index))
        .route("/health", get(status::health))
        .route("/stats", get(status::stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
