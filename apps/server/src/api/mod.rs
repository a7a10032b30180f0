pub mod ingest;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::main_lib::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", ingest::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
