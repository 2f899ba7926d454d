use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{health_handler, stream_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/stream/{video_id}", get(stream_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
